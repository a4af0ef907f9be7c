pub mod config;
pub mod modules;
pub mod server;
pub mod services;

use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use config::Service;
use modules::{backend::backend_routes, frontend::frontend_routes};
use services::errors::{handle_panic, not_found, report_errors};
use services::metrics::{
    metrics_middleware, HttpMetrics, MetricsError, MetricsRegistry, MetricsSource,
};

/// Request bodies above this size are rejected with 413.
pub const BODY_LIMIT_BYTES: usize = 100 * 1024;

pub struct AppState {
    pub service: Service,
    pub metrics: HttpMetrics,
    pub exporter: Arc<dyn MetricsSource>,
}

impl AppState {
    /// Register the service's metric set into `registry` and export from it.
    pub fn new(service: Service, registry: Arc<MetricsRegistry>) -> Result<Arc<Self>, MetricsError> {
        let metrics = match service {
            Service::Backend => HttpMetrics::backend(&registry)?,
            Service::Frontend => HttpMetrics::frontend(&registry)?,
        };

        Ok(Self::with_exporter(service, metrics, registry))
    }

    pub fn with_exporter(
        service: Service,
        metrics: HttpMetrics,
        exporter: Arc<dyn MetricsSource>,
    ) -> Arc<Self> {
        Arc::new(Self {
            service,
            metrics,
            exporter,
        })
    }
}

pub fn create_backend_app(state: Arc<AppState>) -> Router {
    build_backend_app(backend_routes(), state)
}

/// Wrap backend routes in the fallback and the full middleware stack.
///
/// Layers run outermost first: CORS, tracing, instrumentation, error
/// reporting, body limit, panic guard.
pub fn build_backend_app(routes: Router<Arc<AppState>>, state: Arc<AppState>) -> Router {
    let metrics = state.metrics.clone();

    routes
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(middleware::from_fn_with_state(metrics.clone(), report_errors))
        .layer(middleware::from_fn_with_state(metrics, metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn create_frontend_app(state: Arc<AppState>) -> Router {
    let metrics = state.metrics.clone();

    frontend_routes()
        .layer(middleware::from_fn_with_state(metrics, metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the router for whichever service `state` belongs to.
pub fn create_app(state: Arc<AppState>) -> Router {
    match state.service {
        Service::Backend => create_backend_app(state),
        Service::Frontend => create_frontend_app(state),
    }
}
