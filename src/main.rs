//! Keygate Server — Activation Authority
//!
//! Main entry point that wires all crates together and starts the server.

use tracing_subscriber::{fmt, EnvFilter};

use keygate_core::config::AppConfig;
use keygate_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("KEYGATE_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Keygate v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Make sure the database directory exists ──────────
    create_database_directory(&config).await?;

    // ── Step 2: Database connection + migrations ─────────────────
    let db = keygate_database::connection::DatabasePool::connect(&config.database).await?;
    keygate_database::migration::run_migrations(db.pool()).await?;

    if config.admin.secret.is_empty() {
        tracing::warn!("No admin secret configured; the /api/admin surface is disabled");
    }

    // ── Step 3: Build state and router ───────────────────────────
    let state = keygate_api::state::AppState::new(config.clone(), db.into_pool());
    let app = keygate_api::router::build_router(state);

    // ── Step 4: Start HTTP server ────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Keygate activation server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Keygate server shut down gracefully");
    Ok(())
}

/// Create the directory holding the SQLite file, if the URL points at one.
async fn create_database_directory(config: &AppConfig) -> Result<(), AppError> {
    let path = config
        .database
        .url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if path.starts_with(':') {
        // In-memory database, nothing to create.
        return Ok(());
    }
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::internal(format!(
                    "Failed to create dir '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
