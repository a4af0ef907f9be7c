use prometheus::{core::Collector, Encoder, Registry, TextEncoder};
use std::collections::BTreeSet;
use std::sync::Mutex;

use super::MetricsError;

/// Something that can render a scrape snapshot.
///
/// The `/metrics` handlers depend on this rather than on the concrete
/// registry so export failures can be exercised.
pub trait MetricsSource: Send + Sync {
    fn content_type(&self) -> &'static str;

    fn export(&self) -> Result<String, MetricsError>;
}

/// Registry holding every metric of one service instance.
///
/// Constructed once at startup and shared by `Arc`; nothing here is global,
/// so every test can build its own.
pub struct MetricsRegistry {
    registry: Registry,
    names: Mutex<BTreeSet<String>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            names: Mutex::new(BTreeSet::new()),
        }
    }

    /// Add a counter or histogram. Names must be unique within the registry.
    pub fn register(&self, collector: Box<dyn Collector>) -> Result<(), MetricsError> {
        let names: Vec<String> = collector
            .desc()
            .iter()
            .map(|desc| desc.fq_name.clone())
            .collect();

        let mut taken = self
            .names
            .lock()
            .map_err(|_| MetricsError::Poisoned)?;

        if let Some(name) = names.iter().find(|name| taken.contains(*name)) {
            return Err(MetricsError::AlreadyRegistered(name.clone()));
        }

        self.registry.register(collector).map_err(|e| match e {
            prometheus::Error::AlreadyReg => MetricsError::AlreadyRegistered(names.join(",")),
            other => MetricsError::Registration(other),
        })?;
        taken.extend(names.iter().cloned());

        tracing::debug!(metrics = ?names, "registered metric");
        Ok(())
    }

    /// Register CPU, memory, file descriptor and start-time metrics for the
    /// current process.
    #[cfg(target_os = "linux")]
    pub fn register_process_collector(&self) -> Result<(), MetricsError> {
        self.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))
    }

    #[cfg(not(target_os = "linux"))]
    pub fn register_process_collector(&self) -> Result<(), MetricsError> {
        tracing::warn!("process metrics are only available on linux");
        Ok(())
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for MetricsRegistry {
    fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    /// Export metrics in Prometheus text format
    fn export(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
