//! License key repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use keygate_core::error::{AppError, ErrorKind};
use keygate_core::result::AppResult;
use keygate_entity::license::{LicenseKey, LicenseKeyWithDevices};

/// Repository for activation key records.
#[derive(Debug, Clone)]
pub struct LicenseKeyRepository {
    pool: SqlitePool,
}

impl LicenseKeyRepository {
    /// Create a new license key repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a freshly generated key.
    pub async fn insert(
        &self,
        code: &str,
        buyer_name: &str,
        email: Option<&str>,
        max_devices: i64,
    ) -> AppResult<LicenseKey> {
        sqlx::query_as::<_, LicenseKey>(
            "INSERT INTO license_keys (code, buyer_name, email, max_devices, active, created_at) \
             VALUES (?, ?, ?, ?, TRUE, ?) RETURNING *",
        )
        .bind(code)
        .bind(buyer_name)
        .bind(email)
        .bind(max_devices)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert key", e))
    }

    /// Find a key by its code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<LicenseKey>> {
        sqlx::query_as::<_, LicenseKey>("SELECT * FROM license_keys WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find key", e))
    }

    /// List all keys with their live device counts, newest first.
    pub async fn list_with_counts(&self) -> AppResult<Vec<LicenseKeyWithDevices>> {
        sqlx::query_as::<_, LicenseKeyWithDevices>(
            "SELECT k.*, \
               (SELECT COUNT(*) FROM devices d WHERE d.key_id = k.id) AS device_count \
             FROM license_keys k \
             ORDER BY k.created_at DESC, k.id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list keys", e))
    }

    /// Set the active flag of a key. Returns true iff a row was updated.
    pub async fn set_active(&self, code: &str, active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE license_keys SET active = ? WHERE code = ?")
            .bind(active)
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update key status", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
