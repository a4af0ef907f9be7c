use axum::{routing::get, Router};
use std::sync::Arc;

use super::controller;
use crate::modules::metrics::metrics_routes;
use crate::AppState;

pub fn frontend_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(controller::root))
        .merge(metrics_routes())
}
