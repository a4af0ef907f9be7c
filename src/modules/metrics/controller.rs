use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::config::Service;
use crate::services::errors::ErrorResponse;
use crate::services::metrics::{ErrorAccounting, MetricsError, MetricsSource};
use crate::AppState;

const EXPORT_FAILED: &str = "Failed to generate metrics";

/// Handler for GET /metrics endpoint
/// Returns Prometheus metrics in text format
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    tracing::debug!(service = state.service.name(), "serving prometheus metrics");

    match render(state.exporter.as_ref()) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "error generating prometheus metrics");
            export_failed(state.service)
        }
    }
}

fn render(exporter: &dyn MetricsSource) -> Result<Response, MetricsError> {
    let output = exporter.export()?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, exporter.content_type())],
        output,
    )
        .into_response())
}

/// The backend answers with its JSON error shape but keeps the failure out
/// of the error counter. The frontend has no error counter and answers in
/// plain text.
fn export_failed(service: Service) -> Response {
    match service {
        Service::Backend => {
            let mut response = (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(EXPORT_FAILED)),
            )
                .into_response();
            response.extensions_mut().insert(ErrorAccounting::Bypassed);
            response
        }
        Service::Frontend => (StatusCode::INTERNAL_SERVER_ERROR, EXPORT_FAILED).into_response(),
    }
}
