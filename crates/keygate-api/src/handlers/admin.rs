//! Admin handlers — key issuance, listing, inspection, block/unblock.
//!
//! All routes here sit behind the shared-secret middleware; reaching a
//! handler means the caller already presented the admin secret.

use axum::extract::{Path, State};
use axum::Json;

use keygate_core::error::AppError;

use crate::dto::request::{GenerateKeyRequest, KeyActionRequest};
use crate::dto::response::{
    GenerateKeyResponse, KeyDetailResponse, KeySummary, ListKeysResponse, SimpleResponse,
};
use crate::dto::validate_request;
use crate::state::AppState;

/// POST /api/admin/gerar
pub async fn generate_key(
    State(state): State<AppState>,
    Json(req): Json<GenerateKeyRequest>,
) -> Result<Json<GenerateKeyResponse>, AppError> {
    validate_request(&req)?;

    let key = state
        .activation
        .create_key(&req.buyer_name, req.email.as_deref(), req.max_devices)
        .await?;

    Ok(Json(GenerateKeyResponse {
        success: true,
        code: key.code,
    }))
}

/// GET /api/admin/listar
pub async fn list_keys(
    State(state): State<AppState>,
) -> Result<Json<ListKeysResponse>, AppError> {
    let keys = state.activation.list_keys().await?;
    Ok(Json(ListKeysResponse {
        keys: keys.into_iter().map(KeySummary::from).collect(),
    }))
}

/// GET /api/admin/ver/{chave}
pub async fn inspect_key(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<KeyDetailResponse>, AppError> {
    let inspection = state
        .activation
        .inspect_key(&code)
        .await?
        .ok_or_else(|| AppError::not_found("Chave não encontrada"))?;
    Ok(Json(KeyDetailResponse::from(inspection)))
}

/// POST /api/admin/bloquear
pub async fn block_key(
    State(state): State<AppState>,
    Json(req): Json<KeyActionRequest>,
) -> Result<Json<SimpleResponse>, AppError> {
    set_active(state, req, false).await
}

/// POST /api/admin/desbloquear
pub async fn unblock_key(
    State(state): State<AppState>,
    Json(req): Json<KeyActionRequest>,
) -> Result<Json<SimpleResponse>, AppError> {
    set_active(state, req, true).await
}

async fn set_active(
    state: AppState,
    req: KeyActionRequest,
    active: bool,
) -> Result<Json<SimpleResponse>, AppError> {
    validate_request(&req)?;

    let changed = state.activation.set_key_active(&req.code, active).await?;
    let response = if changed {
        SimpleResponse::ok()
    } else {
        SimpleResponse::failed("Chave não encontrada")
    };
    Ok(Json(response))
}
