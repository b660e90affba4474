//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keygate_entity::device::Device;
use keygate_entity::license::LicenseKeyWithDevices;
use keygate_service::KeyInspection;

/// Reply of `POST /api/ativar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateResponse {
    /// Whether the device was bound.
    #[serde(rename = "sucesso")]
    pub success: bool,
    /// The issued (or existing) token on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Refusal reason on failure.
    #[serde(rename = "erro", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActivateResponse {
    /// Successful activation carrying the token.
    pub fn activated(token: String) -> Self {
        Self {
            success: true,
            token: Some(token),
            error: None,
        }
    }

    /// Refused activation with a user-facing reason.
    pub fn refused(error: impl Into<String>) -> Self {
        Self {
            success: false,
            token: None,
            error: Some(error.into()),
        }
    }
}

/// Reply of `POST /api/verificar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Whether the token is still accepted.
    #[serde(rename = "valido")]
    pub valid: bool,
    /// Disclosed reason when invalid.
    #[serde(rename = "erro", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply of `POST /api/desativar` and the admin key actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleResponse {
    /// Whether the operation changed anything.
    #[serde(rename = "sucesso")]
    pub success: bool,
    /// Reason when nothing changed.
    #[serde(rename = "erro", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SimpleResponse {
    /// Positive outcome.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Negative outcome with a reason.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Reply of `GET /api/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always `"online"`.
    pub status: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
}

/// Reply of `POST /api/admin/gerar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateKeyResponse {
    /// Always true on 200.
    #[serde(rename = "sucesso")]
    pub success: bool,
    /// The freshly issued key code.
    #[serde(rename = "chave")]
    pub code: String,
}

/// One key in the admin listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeySummary {
    /// Key code.
    #[serde(rename = "chave")]
    pub code: String,
    /// Buyer name.
    #[serde(rename = "nomeComprador")]
    pub buyer_name: String,
    /// Buyer contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Device quota.
    #[serde(rename = "maxDispositivos")]
    pub max_devices: i64,
    /// Whether the key accepts activations.
    #[serde(rename = "ativa")]
    pub active: bool,
    /// When the key was issued.
    #[serde(rename = "criadaEm")]
    pub created_at: DateTime<Utc>,
    /// Live count of bound devices.
    #[serde(rename = "dispositivosAtivos")]
    pub device_count: i64,
}

impl From<LicenseKeyWithDevices> for KeySummary {
    fn from(key: LicenseKeyWithDevices) -> Self {
        Self {
            code: key.code,
            buyer_name: key.buyer_name,
            email: key.email,
            max_devices: key.max_devices,
            active: key.active,
            created_at: key.created_at,
            device_count: key.device_count,
        }
    }
}

/// Reply of `GET /api/admin/listar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListKeysResponse {
    /// All keys, newest first.
    #[serde(rename = "chaves")]
    pub keys: Vec<KeySummary>,
}

/// One bound device in the admin detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Device fingerprint.
    pub fingerprint: String,
    /// Device label.
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// When the device was first bound.
    #[serde(rename = "ativadoEm")]
    pub activated_at: DateTime<Utc>,
    /// Last successful activation or verification.
    #[serde(rename = "ultimoAcesso")]
    pub last_seen_at: DateTime<Utc>,
}

impl From<Device> for DeviceSummary {
    fn from(device: Device) -> Self {
        Self {
            fingerprint: device.fingerprint,
            name: device.name,
            activated_at: device.activated_at,
            last_seen_at: device.last_seen_at,
        }
    }
}

/// Reply of `GET /api/admin/ver/{chave}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDetailResponse {
    /// Key code.
    #[serde(rename = "chave")]
    pub code: String,
    /// Buyer name.
    #[serde(rename = "nomeComprador")]
    pub buyer_name: String,
    /// Buyer contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Device quota.
    #[serde(rename = "maxDispositivos")]
    pub max_devices: i64,
    /// Whether the key accepts activations.
    #[serde(rename = "ativa")]
    pub active: bool,
    /// When the key was issued.
    #[serde(rename = "criadaEm")]
    pub created_at: DateTime<Utc>,
    /// Devices bound to the key, newest activation first.
    #[serde(rename = "dispositivos")]
    pub devices: Vec<DeviceSummary>,
}

impl From<KeyInspection> for KeyDetailResponse {
    fn from(inspection: KeyInspection) -> Self {
        Self {
            code: inspection.key.code,
            buyer_name: inspection.key.buyer_name,
            email: inspection.key.email,
            max_devices: inspection.key.max_devices,
            active: inspection.key.active,
            created_at: inspection.key.created_at,
            devices: inspection.devices.into_iter().map(Into::into).collect(),
        }
    }
}
