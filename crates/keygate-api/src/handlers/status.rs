//! Health check handler.

use axum::Json;
use chrono::Utc;

use crate::dto::response::StatusResponse;

/// GET /api/status
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online".to_string(),
        timestamp: Utc::now(),
    })
}
