use axum::Json;
use serde::Serialize;

use crate::services::errors::ApiError;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /api/message
pub async fn get_message() -> Result<Json<MessageResponse>, ApiError> {
    Ok(Json(MessageResponse {
        message: "Hello from backend!",
    }))
}
