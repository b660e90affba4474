//! Integration tests for the public activation protocol.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_activate_requires_key_and_fingerprint() {
    let app = helpers::TestApp::new().await;

    let response = app.request("POST", "/api/ativar", Some(json!({})), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            "/api/ativar",
            Some(json!({ "chave": "KG-2026-AAAA-BBBB-CCCC" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activate_unknown_key_is_refused() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/ativar",
            Some(json!({ "chave": "KG-2026-AAAA-BBBB-CCCC", "fingerprint": "fp1" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["sucesso"], false);
    assert_eq!(response.body["erro"], "Chave não encontrada");
}

#[tokio::test]
async fn test_rebind_returns_the_same_token_without_consuming_quota() {
    let app = helpers::TestApp::new().await;
    let code = app.generate_key("Bruno", 1).await;

    let first = app.activate(&code, "fpA").await;
    let second = app.activate(&code, "fpA").await;
    assert_eq!(first, second);

    let detail = app
        .request(
            "GET",
            &format!("/api/admin/ver/{code}"),
            None,
            Some(helpers::ADMIN_SECRET),
        )
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["dispositivos"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_quota_rejects_the_extra_device() {
    let app = helpers::TestApp::new().await;
    let code = app.generate_key("Carla", 2).await;

    app.activate(&code, "fp1").await;
    app.activate(&code, "fp2").await;

    let response = app
        .request(
            "POST",
            "/api/ativar",
            Some(json!({ "chave": code, "fingerprint": "fp3" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["sucesso"], false);
    let erro = response.body["erro"].as_str().unwrap();
    assert!(erro.contains("Limite de 2 dispositivos"), "got: {erro}");
}

#[tokio::test]
async fn test_verify_refuses_a_foreign_fingerprint_without_details() {
    let app = helpers::TestApp::new().await;
    let code = app.generate_key("Diego", 1).await;
    let token = app.activate(&code, "fpA").await;

    let response = app
        .request(
            "POST",
            "/api/verificar",
            Some(json!({ "token": token, "fingerprint": "fpB" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["valido"], false);
    assert!(response.body.get("erro").is_none());
}

#[tokio::test]
async fn test_deactivation_frees_a_quota_slot() {
    let app = helpers::TestApp::new().await;
    let code = app.generate_key("Elisa", 1).await;
    let token = app.activate(&code, "fpA").await;

    let response = app
        .request(
            "POST",
            "/api/desativar",
            Some(json!({ "chave": code, "fingerprint": "fpA" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["sucesso"], true);

    // The revoked token no longer verifies.
    let response = app
        .request(
            "POST",
            "/api/verificar",
            Some(json!({ "token": token, "fingerprint": "fpA" })),
            None,
        )
        .await;
    assert_eq!(response.body["valido"], false);

    // And the slot accepts another device.
    app.activate(&code, "fpB").await;
}

#[tokio::test]
async fn test_deactivating_an_unknown_device_reports_failure() {
    let app = helpers::TestApp::new().await;
    let code = app.generate_key("Fábio", 1).await;

    let response = app
        .request(
            "POST",
            "/api/desativar",
            Some(json!({ "chave": code, "fingerprint": "never-bound" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["sucesso"], false);
    assert_eq!(response.body["erro"], "Dispositivo não encontrado");
}

/// The end-to-end scenario: single-seat key, second device refused,
/// block cascades to verification and rebinding, unblock restores both.
#[tokio::test]
async fn test_single_seat_block_unblock_lifecycle() {
    let app = helpers::TestApp::new().await;
    let code = app.generate_key("Ana", 1).await;

    // First device binds.
    let token = app.activate(&code, "fpA").await;

    // Second fingerprint hits the quota.
    let refused = app
        .request(
            "POST",
            "/api/ativar",
            Some(json!({ "chave": code, "fingerprint": "fpB" })),
            None,
        )
        .await;
    assert_eq!(refused.status, StatusCode::FORBIDDEN);
    assert!(refused.body["erro"]
        .as_str()
        .unwrap()
        .contains("Limite de 1 dispositivos"));

    // The bound device verifies.
    let ok = app
        .request(
            "POST",
            "/api/verificar",
            Some(json!({ "token": token, "fingerprint": "fpA" })),
            None,
        )
        .await;
    assert_eq!(ok.body["valido"], true);

    // Block the key: verification now fails with the disclosed reason,
    // and even the bound fingerprint cannot rebind.
    let blocked = app
        .request(
            "POST",
            "/api/admin/bloquear",
            Some(json!({ "chave": code })),
            Some(helpers::ADMIN_SECRET),
        )
        .await;
    assert_eq!(blocked.body["sucesso"], true);

    let invalid = app
        .request(
            "POST",
            "/api/verificar",
            Some(json!({ "token": token, "fingerprint": "fpA" })),
            None,
        )
        .await;
    assert_eq!(invalid.body["valido"], false);
    assert_eq!(invalid.body["erro"], "Chave bloqueada");

    let rebind = app
        .request(
            "POST",
            "/api/ativar",
            Some(json!({ "chave": code, "fingerprint": "fpA" })),
            None,
        )
        .await;
    assert_eq!(rebind.status, StatusCode::FORBIDDEN);
    assert!(rebind.body["erro"].as_str().unwrap().contains("bloqueada"));

    // Unblock: the original token verifies again.
    let unblocked = app
        .request(
            "POST",
            "/api/admin/desbloquear",
            Some(json!({ "chave": code })),
            Some(helpers::ADMIN_SECRET),
        )
        .await;
    assert_eq!(unblocked.body["sucesso"], true);

    let valid_again = app
        .request(
            "POST",
            "/api/verificar",
            Some(json!({ "token": token, "fingerprint": "fpA" })),
            None,
        )
        .await;
    assert_eq!(valid_again.body["valido"], true);
}

#[tokio::test]
async fn test_key_codes_are_accepted_case_insensitively() {
    let app = helpers::TestApp::new().await;
    let code = app.generate_key("Gina", 1).await;

    let response = app
        .request(
            "POST",
            "/api/ativar",
            Some(json!({ "chave": format!("  {}  ", code.to_lowercase()), "fingerprint": "fpA" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["sucesso"], true);
}
