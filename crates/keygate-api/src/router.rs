//! Route definitions for the Keygate HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState`
//! and passes it to all handlers via Axum's `State` extractor.

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use keygate_core::config::app::CorsConfig;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = activation_routes().merge(admin_routes(&state));

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Public protocol endpoints: activate, verify, deactivate, status.
fn activation_routes() -> Router<AppState> {
    Router::new()
        .route("/ativar", post(handlers::activation::activate))
        .route("/verificar", post(handlers::activation::verify))
        .route("/desativar", post(handlers::activation::deactivate))
        .route("/status", get(handlers::status::status))
}

/// Admin endpoints, gated by the shared-secret middleware.
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/gerar", post(handlers::admin::generate_key))
        .route("/admin/listar", get(handlers::admin::list_keys))
        .route("/admin/ver/{chave}", get(handlers::admin::inspect_key))
        .route("/admin/bloquear", post(handlers::admin::block_key))
        .route("/admin/desbloquear", post(handlers::admin::unblock_key))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::admin::require_admin_secret,
        ))
}

/// Build the CORS layer from configuration.
///
/// The artifact is opened from `file://` and arbitrary origins, so the
/// default configuration allows any origin.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    use axum::http::Method;
    use tower_http::cors::Any;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(config.max_age_seconds));

    if config.allowed_origins.contains(&"*".to_string()) {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<axum::http::HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    cors
}
