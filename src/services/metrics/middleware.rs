use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, Method, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use http_body::{Body as HttpBody, Frame, SizeHint};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use super::HttpMetrics;

/// Response extension telling [`metrics_middleware`] that the error
/// classification of a response was settled elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorAccounting {
    /// Counted once by the error reporting path.
    Reported,
    /// Unmatched-route 404, never counted.
    Unmatched,
    /// Failure answered directly by a handler without counting.
    Bypassed,
}

/// Start of one request, created before the handler runs.
pub struct RequestTimer {
    start: Instant,
    method: Method,
    uri: Uri,
}

impl RequestTimer {
    pub fn start(req: &Request) -> Self {
        Self {
            start: Instant::now(),
            method: req.method().clone(),
            uri: req.uri().clone(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

struct Completion {
    metrics: HttpMetrics,
    timer: RequestTimer,
    status: StatusCode,
    count_error: bool,
}

impl Completion {
    fn finish(self) {
        let duration = self.timer.elapsed_secs();
        self.metrics.record_duration(duration);
        if self.count_error {
            self.metrics.record_error();
        }

        tracing::info!(
            method = %self.timer.method,
            uri = %self.timer.uri,
            status = self.status.as_u16(),
            "request processed in {:.3} seconds",
            duration
        );
    }
}

/// Response body that records the request's duration once the body has been
/// fully sent, has failed, or has been dropped by the transport.
pub struct InstrumentedBody {
    inner: Body,
    completion: Option<Completion>,
}

impl InstrumentedBody {
    pub fn wrap(
        inner: Body,
        metrics: HttpMetrics,
        timer: RequestTimer,
        status: StatusCode,
        count_error: bool,
    ) -> Self {
        Self {
            inner,
            completion: Some(Completion {
                metrics,
                timer,
                status,
                count_error,
            }),
        }
    }

    fn complete(&mut self) {
        if let Some(completion) = self.completion.take() {
            completion.finish();
        }
    }
}

impl HttpBody for InstrumentedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_frame(cx);

        if matches!(poll, Poll::Ready(None) | Poll::Ready(Some(Err(_)))) {
            this.complete();
        }

        poll
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for InstrumentedBody {
    fn drop(&mut self) {
        self.complete();
    }
}

/// Middleware to collect HTTP request metrics
///
/// Counts the request before the handler runs. Duration and error
/// classification are recorded when the response body completes.
pub async fn metrics_middleware(
    State(metrics): State<HttpMetrics>,
    req: Request,
    next: Next,
) -> Response {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "request received");
    tracing::trace!(headers = ?req.headers(), "request headers");
    if let Some(length) = body_length(&req) {
        tracing::trace!(
            length,
            content_type = ?req.headers().get(header::CONTENT_TYPE),
            "request body"
        );
    }

    metrics.record_request();
    let timer = RequestTimer::start(&req);

    let response = next.run(req).await;

    let status = response.status();
    let count_error = is_error_status(status)
        && response.extensions().get::<ErrorAccounting>().is_none();

    let (parts, body) = response.into_parts();
    let body = InstrumentedBody::wrap(body, metrics, timer, status, count_error);

    Response::from_parts(parts, Body::new(body))
}

fn is_error_status(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

/// Declared length of a non-empty request body.
fn body_length(req: &Request) -> Option<u64> {
    req.headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
        .filter(|length| *length > 0)
}
