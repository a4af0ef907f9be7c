pub mod collectors;
pub mod middleware;
pub mod registry;

pub use collectors::HttpMetrics;
pub use middleware::{metrics_middleware, ErrorAccounting, InstrumentedBody, RequestTimer};
pub use registry::{MetricsRegistry, MetricsSource};

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Metric already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Failed to register metric: {0}")]
    Registration(#[source] prometheus::Error),

    #[error("Failed to encode metrics: {0}")]
    Encoding(#[from] prometheus::Error),

    #[error("Encoded metrics are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Metric name index poisoned")]
    Poisoned,
}
