//! The activation protocol core: key issuance, device binding with quota
//! enforcement, token verification, and device revocation.
//!
//! Business-rule failures (unknown key, blocked key, quota reached) are
//! value outcomes, not errors; [`keygate_core::AppError`] is reserved for
//! store failures.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use keygate_core::config::keygen::KeygenConfig;
use keygate_core::error::AppError;
use keygate_core::result::AppResult;
use keygate_database::repositories::device::DeviceRepository;
use keygate_database::repositories::license_key::LicenseKeyRepository;
use keygate_entity::device::Device;
use keygate_entity::license::{LicenseKey, LicenseKeyWithDevices};

use crate::keygen::KeyCodeGenerator;
use crate::token;

/// Device label recorded when the client does not send one.
const UNKNOWN_DEVICE_NAME: &str = "Desconhecido";

/// Outcome of a device bind attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// The device is bound; `token` is its bearer credential. Rebinding an
    /// already-bound fingerprint returns the existing token unchanged.
    Activated {
        /// The device's bearer token.
        token: String,
    },
    /// The bind was refused for a business reason.
    Rejected(BindRejection),
}

/// Why a bind attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindRejection {
    /// No key with the given code exists.
    KeyNotFound,
    /// The key exists but has been deactivated by the operator. A blocked
    /// key rejects every fingerprint, including previously-bound ones.
    KeyBlocked,
    /// The fingerprint is new and the key is already at its device quota.
    QuotaExceeded {
        /// The key's device quota, for the user-facing message.
        max_devices: i64,
    },
}

/// Outcome of a token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The token matches a device under an active key.
    Valid,
    /// The token is not accepted. `reason` is only populated when the
    /// caller is allowed to know why (a blocked key); an unknown token, a
    /// fingerprint mismatch and a revoked device are indistinguishable.
    Invalid {
        /// The reason, when it may be disclosed.
        reason: Option<InvalidReason>,
    },
}

/// Disclosed reason for an invalid verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The owning key has been deactivated.
    KeyBlocked,
}

/// Outcome of a device revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// The device binding was removed.
    Revoked,
    /// No key with the given code exists.
    KeyNotFound,
    /// The key exists but no device with that fingerprint is bound to it.
    DeviceNotFound,
}

/// A key together with its bound devices, for the admin detail view.
#[derive(Debug, Clone)]
pub struct KeyInspection {
    /// The key record.
    pub key: LicenseKey,
    /// Devices bound to the key, newest activation first.
    pub devices: Vec<Device>,
}

/// The activation service.
///
/// Holds the key store and device registry repositories plus the per-key
/// bind locks that make the check-quota-then-insert sequence atomic.
#[derive(Debug)]
pub struct ActivationService {
    keys: Arc<LicenseKeyRepository>,
    devices: Arc<DeviceRepository>,
    keygen: KeyCodeGenerator,
    default_max_devices: i64,
    /// One mutex per key id, created lazily. Held only across the quota
    /// check and insert of a first-time bind.
    bind_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ActivationService {
    /// Creates a new activation service.
    pub fn new(
        keys: Arc<LicenseKeyRepository>,
        devices: Arc<DeviceRepository>,
        keygen_config: &KeygenConfig,
    ) -> Self {
        Self {
            keys,
            devices,
            keygen: KeyCodeGenerator::new(keygen_config),
            default_max_devices: keygen_config.default_max_devices,
            bind_locks: Mutex::new(HashMap::new()),
        }
    }

    // ── Operator key management ──────────────────────────────────

    /// Issue a new activation key.
    ///
    /// Generates codes until one does not collide with an existing key.
    /// Collisions are astronomically unlikely but the loop handles them
    /// exactly rather than probabilistically.
    pub async fn create_key(
        &self,
        buyer_name: &str,
        email: Option<&str>,
        max_devices: Option<i64>,
    ) -> AppResult<LicenseKey> {
        let buyer_name = buyer_name.trim();
        if buyer_name.is_empty() {
            return Err(AppError::validation("Nome do comprador é obrigatório"));
        }
        let max_devices = max_devices.unwrap_or(self.default_max_devices);
        if max_devices < 1 {
            return Err(AppError::validation(
                "Limite de dispositivos deve ser maior que zero",
            ));
        }

        let code = loop {
            let candidate = self.keygen.generate(Utc::now());
            if self.keys.find_by_code(&candidate).await?.is_none() {
                break candidate;
            }
            warn!(code = %candidate, "Key code collision, regenerating");
        };

        let email = email.map(str::trim).filter(|e| !e.is_empty());
        let key = self
            .keys
            .insert(&code, buyer_name, email, max_devices)
            .await?;
        info!(code = %key.code, buyer = %key.buyer_name, max_devices, "Key issued");
        Ok(key)
    }

    /// List all keys with live device counts, newest first.
    pub async fn list_keys(&self) -> AppResult<Vec<LicenseKeyWithDevices>> {
        self.keys.list_with_counts().await
    }

    /// Fetch a key and its bound devices.
    pub async fn inspect_key(&self, code: &str) -> AppResult<Option<KeyInspection>> {
        let code = normalize_code(code);
        let Some(key) = self.keys.find_by_code(&code).await? else {
            return Ok(None);
        };
        let devices = self.devices.list_for_key(key.id).await?;
        Ok(Some(KeyInspection { key, devices }))
    }

    /// Block or unblock a key. Returns true iff the key exists.
    pub async fn set_key_active(&self, code: &str, active: bool) -> AppResult<bool> {
        let code = normalize_code(code);
        let changed = self.keys.set_active(&code, active).await?;
        if changed {
            info!(code = %code, active, "Key status changed");
        }
        Ok(changed)
    }

    // ── The device protocol ──────────────────────────────────────

    /// Bind a device fingerprint to a key, enforcing the key's quota.
    ///
    /// Rebinding an already-bound fingerprint is idempotent: the existing
    /// token is returned and the quota is not re-checked, since the device
    /// is already counted. First-time binds run the quota check and insert
    /// under the key's bind lock so two concurrent binds at the quota
    /// boundary cannot both succeed.
    pub async fn bind_device(
        &self,
        code: &str,
        fingerprint: &str,
        device_name: Option<&str>,
    ) -> AppResult<BindOutcome> {
        let code = normalize_code(code);
        let Some(key) = self.keys.find_by_code(&code).await? else {
            return Ok(BindOutcome::Rejected(BindRejection::KeyNotFound));
        };
        if !key.active {
            return Ok(BindOutcome::Rejected(BindRejection::KeyBlocked));
        }

        if let Some(existing) = self
            .devices
            .find_by_key_and_fingerprint(key.id, fingerprint)
            .await?
        {
            self.devices.touch(existing.id, device_name).await?;
            info!(code = %key.code, fingerprint, "Device reactivated");
            return Ok(BindOutcome::Activated {
                token: existing.token,
            });
        }

        let lock = self.bind_lock(key.id).await;
        let _guard = lock.lock().await;

        // A concurrent bind for this fingerprint may have landed while we
        // waited on the lock; re-check so a late duplicate stays idempotent.
        if let Some(existing) = self
            .devices
            .find_by_key_and_fingerprint(key.id, fingerprint)
            .await?
        {
            self.devices.touch(existing.id, device_name).await?;
            return Ok(BindOutcome::Activated {
                token: existing.token,
            });
        }

        let count = self.devices.count_for_key(key.id).await?;
        if count >= key.max_devices {
            info!(code = %key.code, fingerprint, count, "Bind refused: quota reached");
            return Ok(BindOutcome::Rejected(BindRejection::QuotaExceeded {
                max_devices: key.max_devices,
            }));
        }

        let token = token::generate_token();
        self.devices
            .insert(
                key.id,
                fingerprint,
                device_name.unwrap_or(UNKNOWN_DEVICE_NAME),
                &token,
            )
            .await?;
        info!(code = %key.code, fingerprint, devices = count + 1, "Device bound");
        Ok(BindOutcome::Activated { token })
    }

    /// Verify a device token.
    ///
    /// Never creates rows and never affects quota accounting; a valid
    /// verification only bumps `last_seen_at`.
    pub async fn verify_token(&self, token: &str, fingerprint: &str) -> AppResult<VerifyOutcome> {
        let Some(device) = self.devices.find_by_token(token, fingerprint).await? else {
            return Ok(VerifyOutcome::Invalid { reason: None });
        };
        if !device.key_active {
            return Ok(VerifyOutcome::Invalid {
                reason: Some(InvalidReason::KeyBlocked),
            });
        }
        self.devices.touch(device.id, None).await?;
        Ok(VerifyOutcome::Valid)
    }

    /// Remove a device binding, freeing one quota slot on the key.
    ///
    /// Other devices on the key and the key's active flag are untouched.
    pub async fn revoke_device(&self, code: &str, fingerprint: &str) -> AppResult<RevokeOutcome> {
        let code = normalize_code(code);
        let Some(key) = self.keys.find_by_code(&code).await? else {
            return Ok(RevokeOutcome::KeyNotFound);
        };
        if self.devices.delete(key.id, fingerprint).await? {
            info!(code = %key.code, fingerprint, "Device revoked");
            Ok(RevokeOutcome::Revoked)
        } else {
            Ok(RevokeOutcome::DeviceNotFound)
        }
    }

    async fn bind_lock(&self, key_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.bind_locks.lock().await;
        Arc::clone(locks.entry(key_id).or_default())
    }
}

/// Key codes are typed by humans: trim whitespace and fold to uppercase
/// before any lookup.
fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
