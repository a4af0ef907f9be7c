use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, ConfigError, Service};
use crate::services::metrics::{MetricsError, MetricsRegistry};
use crate::{create_app, AppState};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Metrics setup failed: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "http_monitoring=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Registry and router for `config`'s service.
pub fn build(config: &Config) -> Result<Router, MetricsError> {
    let registry = Arc::new(MetricsRegistry::new());
    if config.collect_default_metrics {
        registry.register_process_collector()?;
    }

    let state = AppState::new(config.service, registry)?;
    Ok(create_app(state))
}

/// Load configuration, bind and serve until Ctrl-C.
pub async fn run(service: Service) -> Result<(), ServerError> {
    let config = Config::from_env(service)?;
    let app = build(&config)?;

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!("{} running on port {}", service.name(), config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("{} stopped", service.name());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
