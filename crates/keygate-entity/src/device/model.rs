//! Bound device entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A device bound to a license key.
///
/// At most one row exists per `(key_id, fingerprint)` pair; re-activation
/// from the same fingerprint reuses the row and its token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Device {
    /// Row identifier.
    pub id: i64,
    /// Owning license key.
    pub key_id: i64,
    /// Client-derived device identifier. Best-effort identity, not
    /// guaranteed unique across installs.
    pub fingerprint: String,
    /// Human-readable device label, best-effort.
    pub name: Option<String>,
    /// Bearer credential issued to this device. Unique across the whole
    /// registry.
    pub token: String,
    /// When the device was first bound.
    pub activated_at: DateTime<Utc>,
    /// Last successful activation or verification.
    pub last_seen_at: DateTime<Utc>,
}

/// A device joined with the `active` flag of its owning key, as produced
/// by token verification lookups.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeviceWithKeyStatus {
    /// Row identifier.
    pub id: i64,
    /// Owning license key.
    pub key_id: i64,
    /// Device fingerprint.
    pub fingerprint: String,
    /// Device label.
    pub name: Option<String>,
    /// Bearer token.
    pub token: String,
    /// When the device was first bound.
    pub activated_at: DateTime<Utc>,
    /// Last successful activation or verification.
    pub last_seen_at: DateTime<Utc>,
    /// Whether the owning key is active.
    pub key_active: bool,
}
