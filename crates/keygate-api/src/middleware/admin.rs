//! Shared-secret gate for the admin surface.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use keygate_core::error::AppError;

use crate::state::AppState;

/// Header carrying the admin shared secret.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Middleware that rejects admin requests without the configured secret.
///
/// The comparison is an exact string match. An empty configured secret
/// means the admin surface is disabled: everything is rejected.
pub async fn require_admin_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let secret = state.config.admin.secret.as_str();
    let presented = request
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());

    match presented {
        Some(value) if !secret.is_empty() && value == secret => Ok(next.run(request).await),
        _ => Err(AppError::unauthorized("Acesso negado")),
    }
}
