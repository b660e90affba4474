//! Device registry repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use keygate_core::error::{AppError, ErrorKind};
use keygate_core::result::AppResult;
use keygate_entity::device::{Device, DeviceWithKeyStatus};

/// Repository for per-key device bindings.
#[derive(Debug, Clone)]
pub struct DeviceRepository {
    pool: SqlitePool,
}

impl DeviceRepository {
    /// Create a new device repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the device bound under a key for a given fingerprint.
    pub async fn find_by_key_and_fingerprint(
        &self,
        key_id: i64,
        fingerprint: &str,
    ) -> AppResult<Option<Device>> {
        sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE key_id = ? AND fingerprint = ?")
            .bind(key_id)
            .bind(fingerprint)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find device", e))
    }

    /// Count the devices currently bound to a key.
    pub async fn count_for_key(&self, key_id: i64) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM devices WHERE key_id = ?")
            .bind(key_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count devices", e))
    }

    /// Bind a new device under a key.
    pub async fn insert(
        &self,
        key_id: i64,
        fingerprint: &str,
        name: &str,
        token: &str,
    ) -> AppResult<Device> {
        let now = Utc::now();
        sqlx::query_as::<_, Device>(
            "INSERT INTO devices (key_id, fingerprint, name, token, activated_at, last_seen_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(key_id)
        .bind(fingerprint)
        .bind(name)
        .bind(token)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert device", e))
    }

    /// Bump a device's last-seen timestamp, optionally replacing its name.
    pub async fn touch(&self, id: i64, name: Option<&str>) -> AppResult<()> {
        sqlx::query("UPDATE devices SET last_seen_at = ?, name = COALESCE(?, name) WHERE id = ?")
            .bind(Utc::now())
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch device", e))?;
        Ok(())
    }

    /// Look up a device by its bearer token and fingerprint, joined with
    /// the owning key's active flag.
    ///
    /// An unknown token, a fingerprint mismatch, and a revoked device all
    /// produce `None` and are indistinguishable to the caller.
    pub async fn find_by_token(
        &self,
        token: &str,
        fingerprint: &str,
    ) -> AppResult<Option<DeviceWithKeyStatus>> {
        sqlx::query_as::<_, DeviceWithKeyStatus>(
            "SELECT d.*, k.active AS key_active \
             FROM devices d \
             JOIN license_keys k ON k.id = d.key_id \
             WHERE d.token = ? AND d.fingerprint = ?",
        )
        .bind(token)
        .bind(fingerprint)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find device by token", e))
    }

    /// Remove a device binding. Returns true iff a row was deleted.
    pub async fn delete(&self, key_id: i64, fingerprint: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM devices WHERE key_id = ? AND fingerprint = ?")
            .bind(key_id)
            .bind(fingerprint)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete device", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// List all devices bound to a key, newest activation first.
    pub async fn list_for_key(&self, key_id: i64) -> AppResult<Vec<Device>> {
        sqlx::query_as::<_, Device>(
            "SELECT * FROM devices WHERE key_id = ? ORDER BY activated_at DESC, id DESC",
        )
        .bind(key_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list devices", e))
    }
}
