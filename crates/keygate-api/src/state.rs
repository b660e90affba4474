//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::SqlitePool;

use keygate_core::config::AppConfig;
use keygate_database::repositories::device::DeviceRepository;
use keygate_database::repositories::license_key::LicenseKeyRepository;
use keygate_service::ActivationService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// SQLite connection pool.
    pub db_pool: SqlitePool,
    /// Key store repository.
    pub key_repo: Arc<LicenseKeyRepository>,
    /// Device registry repository.
    pub device_repo: Arc<DeviceRepository>,
    /// The activation protocol service.
    pub activation: Arc<ActivationService>,
}

impl AppState {
    /// Builds the state from a configuration and an open pool.
    pub fn new(config: AppConfig, db_pool: SqlitePool) -> Self {
        let key_repo = Arc::new(LicenseKeyRepository::new(db_pool.clone()));
        let device_repo = Arc::new(DeviceRepository::new(db_pool.clone()));
        let activation = Arc::new(ActivationService::new(
            Arc::clone(&key_repo),
            Arc::clone(&device_repo),
            &config.keygen,
        ));
        Self {
            config: Arc::new(config),
            db_pool,
            key_repo,
            device_repo,
            activation,
        }
    }
}
