use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;

use super::{ApiError, ErrorResponse, FailureReport};
use crate::services::metrics::{ErrorAccounting, HttpMetrics};

/// Terminal stage for handler failures.
///
/// Takes the [`FailureReport`] left by [`ApiError`], logs it and counts it
/// once. The response is marked so the instrumentation layer does not count
/// it a second time.
pub async fn report_errors(
    State(metrics): State<HttpMetrics>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;

    if let Some(report) = response.extensions_mut().remove::<FailureReport>() {
        tracing::error!(status = report.status.as_u16(), "ERROR: {}", report.message);
        metrics.record_error();
        response.extensions_mut().insert(ErrorAccounting::Reported);
    }

    response
}

/// Fallback for unmatched routes. Not counted as an error.
pub async fn not_found() -> Response {
    let mut response = (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not Found"))).into_response();
    response.extensions_mut().insert(ErrorAccounting::Unmatched);
    response
}

/// Turn a handler panic into a plain 500 failure for [`report_errors`].
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %detail, "handler panicked");
    ApiError::internal().into_response()
}
