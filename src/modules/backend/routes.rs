use axum::{routing::get, Router};
use std::sync::Arc;

use super::controller;
use crate::modules::metrics::metrics_routes;
use crate::AppState;

pub fn backend_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/message", get(controller::get_message))
        .merge(metrics_routes())
}
