use prometheus::{Histogram, HistogramOpts, IntCounter};

use super::{MetricsError, MetricsRegistry};

/// Upper bounds of the request duration histogram, in seconds.
pub const DURATION_BUCKETS: [f64; 5] = [0.1, 0.5, 1.0, 2.0, 5.0];

/// Instruments written by the request pipeline of one service.
///
/// Cloning is cheap: every instrument is a handle onto shared atomics, and
/// the registry the instruments were registered into keeps exporting them.
#[derive(Clone)]
pub struct HttpMetrics {
    pub requests_total: IntCounter,
    pub request_duration_seconds: Histogram,
    /// Absent for services that do not classify errors.
    pub errors_total: Option<IntCounter>,
}

impl HttpMetrics {
    /// Metric set of the backend API.
    pub fn backend(registry: &MetricsRegistry) -> Result<Self, MetricsError> {
        let requests_total = IntCounter::new(
            "http_requests_total",
            "Total number of HTTP requests received",
        )
        .map_err(MetricsError::Registration)?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("http_request_duration_seconds", "Histogram of response time")
                .buckets(DURATION_BUCKETS.to_vec()),
        )
        .map_err(MetricsError::Registration)?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        let errors_total = IntCounter::new("http_errors_total", "Total number of HTTP errors")
            .map_err(MetricsError::Registration)?;
        registry.register(Box::new(errors_total.clone()))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            errors_total: Some(errors_total),
        })
    }

    /// Metric set of the frontend monitoring server. It counts page loads
    /// and their latency only.
    pub fn frontend(registry: &MetricsRegistry) -> Result<Self, MetricsError> {
        let requests_total =
            IntCounter::new("frontend_page_loads", "Total number of page loads")
                .map_err(MetricsError::Registration)?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "frontend_request_duration_seconds",
                "Histogram of response duration in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
        )
        .map_err(MetricsError::Registration)?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        Ok(Self {
            requests_total,
            request_duration_seconds,
            errors_total: None,
        })
    }

    pub fn record_request(&self) {
        self.requests_total.inc();
    }

    pub fn record_duration(&self, duration_secs: f64) {
        self.request_duration_seconds.observe(duration_secs);
    }

    pub fn record_error(&self) {
        if let Some(errors_total) = &self.errors_total {
            errors_total.inc();
        }
    }

    /// Current value of the error counter, zero when the service has none.
    pub fn errors(&self) -> u64 {
        self.errors_total.as_ref().map_or(0, IntCounter::get)
    }
}
