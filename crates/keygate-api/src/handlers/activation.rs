//! Public activation protocol handlers — activate, verify, deactivate.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use keygate_core::error::AppError;
use keygate_service::{BindOutcome, BindRejection, InvalidReason, RevokeOutcome, VerifyOutcome};

use crate::dto::request::{ActivateRequest, DeactivateRequest, VerifyRequest};
use crate::dto::response::{ActivateResponse, SimpleResponse, VerifyResponse};
use crate::dto::validate_request;
use crate::state::AppState;

/// POST /api/ativar
pub async fn activate(
    State(state): State<AppState>,
    Json(req): Json<ActivateRequest>,
) -> Result<(StatusCode, Json<ActivateResponse>), AppError> {
    validate_request(&req)?;

    let outcome = state
        .activation
        .bind_device(&req.code, &req.fingerprint, req.device_name.as_deref())
        .await?;

    let response = match outcome {
        BindOutcome::Activated { token } => {
            (StatusCode::OK, Json(ActivateResponse::activated(token)))
        }
        BindOutcome::Rejected(reason) => (
            StatusCode::FORBIDDEN,
            Json(ActivateResponse::refused(rejection_message(&reason))),
        ),
    };
    Ok(response)
}

/// POST /api/verificar
///
/// Negative outcomes are 200 with `valido:false`; clients branch on the
/// body, not the status.
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    validate_request(&req)?;

    let outcome = state
        .activation
        .verify_token(&req.token, &req.fingerprint)
        .await?;

    let response = match outcome {
        VerifyOutcome::Valid => VerifyResponse {
            valid: true,
            error: None,
        },
        VerifyOutcome::Invalid { reason } => VerifyResponse {
            valid: false,
            error: reason.map(|r| match r {
                InvalidReason::KeyBlocked => "Chave bloqueada".to_string(),
            }),
        },
    };
    Ok(Json(response))
}

/// POST /api/desativar
pub async fn deactivate(
    State(state): State<AppState>,
    Json(req): Json<DeactivateRequest>,
) -> Result<Json<SimpleResponse>, AppError> {
    validate_request(&req)?;

    let outcome = state
        .activation
        .revoke_device(&req.code, &req.fingerprint)
        .await?;

    let response = match outcome {
        RevokeOutcome::Revoked => SimpleResponse::ok(),
        RevokeOutcome::KeyNotFound => SimpleResponse::failed("Chave não encontrada"),
        RevokeOutcome::DeviceNotFound => SimpleResponse::failed("Dispositivo não encontrado"),
    };
    Ok(Json(response))
}

fn rejection_message(reason: &BindRejection) -> String {
    match reason {
        BindRejection::KeyNotFound => "Chave não encontrada".to_string(),
        BindRejection::KeyBlocked => {
            "Chave bloqueada. Entre em contato com o suporte.".to_string()
        }
        BindRejection::QuotaExceeded { max_devices } => format!(
            "Limite de {max_devices} dispositivos atingido. Desative um dispositivo para ativar outro."
        ),
    }
}
