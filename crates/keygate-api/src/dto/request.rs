//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/ativar`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ActivateRequest {
    /// Key code typed by the user.
    #[serde(rename = "chave", default)]
    #[validate(length(min = 1, message = "Chave e fingerprint são obrigatórios"))]
    pub code: String,
    /// Device fingerprint derived by the client.
    #[serde(default)]
    #[validate(length(min = 1, message = "Chave e fingerprint são obrigatórios"))]
    pub fingerprint: String,
    /// Optional device label.
    #[serde(rename = "nomeDispositivo", default)]
    pub device_name: Option<String>,
}

/// Body of `POST /api/verificar`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyRequest {
    /// The device's bearer token.
    #[serde(default)]
    #[validate(length(min = 1, message = "Token e fingerprint são obrigatórios"))]
    pub token: String,
    /// Device fingerprint.
    #[serde(default)]
    #[validate(length(min = 1, message = "Token e fingerprint são obrigatórios"))]
    pub fingerprint: String,
}

/// Body of `POST /api/desativar`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeactivateRequest {
    /// Key code.
    #[serde(rename = "chave", default)]
    #[validate(length(min = 1, message = "Chave e fingerprint são obrigatórios"))]
    pub code: String,
    /// Device fingerprint.
    #[serde(default)]
    #[validate(length(min = 1, message = "Chave e fingerprint são obrigatórios"))]
    pub fingerprint: String,
}

/// Body of `POST /api/admin/gerar`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateKeyRequest {
    /// Buyer name.
    #[serde(rename = "nome", default)]
    #[validate(length(min = 1, message = "Nome do comprador é obrigatório"))]
    pub buyer_name: String,
    /// Buyer contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Device quota for the new key; server default when omitted.
    #[serde(rename = "maxDispositivos", default)]
    pub max_devices: Option<i64>,
}

/// Body of `POST /api/admin/bloquear` and `/api/admin/desbloquear`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct KeyActionRequest {
    /// Key code.
    #[serde(rename = "chave", default)]
    #[validate(length(min = 1, message = "Chave é obrigatória"))]
    pub code: String,
}
