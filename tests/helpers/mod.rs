//! Shared test helpers for integration tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use keygate_core::config::AppConfig;

/// Admin secret configured for every test app.
pub const ADMIN_SECRET: &str = "test-admin-secret";

/// Test application context.
pub struct TestApp {
    /// The Axum router for making test requests.
    pub router: Router,
    /// Holds the temp directory containing the SQLite file alive.
    _db_dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application backed by a throwaway database.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config: AppConfig =
            serde_json::from_str("{}").expect("Failed to build default config");
        config.database.url = format!("sqlite://{}", db_dir.path().join("test.db").display());
        config.database.max_connections = 1;
        config.admin.secret = ADMIN_SECRET.to_string();

        let db = keygate_database::connection::DatabasePool::connect(&config.database)
            .await
            .expect("Failed to open test database");
        keygate_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let state = keygate_api::state::AppState::new(config, db.into_pool());
        let router = keygate_api::router::build_router(state);

        Self {
            router,
            _db_dir: db_dir,
        }
    }

    /// Make an HTTP request to the test app.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        admin_secret: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(secret) = admin_secret {
            req = req.header("x-admin-secret", secret);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Issue a key through the admin surface and return its code.
    pub async fn generate_key(&self, buyer: &str, max_devices: i64) -> String {
        let response = self
            .request(
                "POST",
                "/api/admin/gerar",
                Some(serde_json::json!({ "nome": buyer, "maxDispositivos": max_devices })),
                Some(ADMIN_SECRET),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Key generation failed: {:?}",
            response.body
        );
        response.body["chave"]
            .as_str()
            .expect("No chave in response")
            .to_string()
    }

    /// Activate a fingerprint and return the issued token.
    pub async fn activate(&self, code: &str, fingerprint: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/ativar",
                Some(serde_json::json!({ "chave": code, "fingerprint": fingerprint })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Activation failed: {:?}",
            response.body
        );
        response.body["token"]
            .as_str()
            .expect("No token in response")
            .to_string()
    }
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Parsed JSON body.
    pub body: Value,
}
