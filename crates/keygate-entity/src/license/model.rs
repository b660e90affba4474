//! License key entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An operator-issued activation key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LicenseKey {
    /// Row identifier.
    pub id: i64,
    /// Human-typeable code in the form `PREFIX-YEAR-XXXX-XXXX-XXXX`.
    pub code: String,
    /// Name of the buyer this key was issued to.
    pub buyer_name: String,
    /// Buyer contact email, if known.
    pub email: Option<String>,
    /// Maximum number of devices that may be bound to this key.
    pub max_devices: i64,
    /// Whether the key accepts activations and verifications.
    /// An inactive key rejects every bound device.
    pub active: bool,
    /// When the key was issued.
    pub created_at: DateTime<Utc>,
}

/// A license key enriched with its live device count, as returned by the
/// admin listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LicenseKeyWithDevices {
    /// Row identifier.
    pub id: i64,
    /// Key code.
    pub code: String,
    /// Buyer name.
    pub buyer_name: String,
    /// Buyer contact email, if known.
    pub email: Option<String>,
    /// Device quota.
    pub max_devices: i64,
    /// Whether the key is active.
    pub active: bool,
    /// When the key was issued.
    pub created_at: DateTime<Utc>,
    /// Number of devices currently bound to the key.
    pub device_count: i64,
}
