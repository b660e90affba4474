//! Integration tests for the admin surface.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_admin_requires_the_shared_secret() {
    let app = helpers::TestApp::new().await;

    let missing = app.request("GET", "/api/admin/listar", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let wrong = app
        .request("GET", "/api/admin/listar", None, Some("not-the-secret"))
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let right = app
        .request("GET", "/api/admin/listar", None, Some(helpers::ADMIN_SECRET))
        .await;
    assert_eq!(right.status, StatusCode::OK);
}

#[tokio::test]
async fn test_generate_requires_a_buyer_name() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/admin/gerar",
            Some(json!({ "nome": "" })),
            Some(helpers::ADMIN_SECRET),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generated_codes_use_the_unambiguous_format() {
    let app = helpers::TestApp::new().await;
    let code = app.generate_key("Helena", 3).await;

    let parts: Vec<&str> = code.split('-').collect();
    assert_eq!(parts.len(), 5, "unexpected shape: {code}");
    assert_eq!(parts[0], "KG");
    assert_eq!(parts[1].len(), 4);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    for block in &parts[2..] {
        assert_eq!(block.len(), 4);
        for c in block.chars() {
            assert!(
                "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".contains(c),
                "ambiguous character {c:?} in {code}"
            );
        }
    }
}

#[tokio::test]
async fn test_listing_reports_live_device_counts_newest_first() {
    let app = helpers::TestApp::new().await;
    let older = app.generate_key("Primeira", 3).await;
    let newer = app.generate_key("Segunda", 2).await;
    app.activate(&older, "fp1").await;
    app.activate(&older, "fp2").await;

    let response = app
        .request("GET", "/api/admin/listar", None, Some(helpers::ADMIN_SECRET))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let keys = response.body["chaves"].as_array().unwrap();
    assert_eq!(keys.len(), 2);

    let by_code = |code: &str| {
        keys.iter()
            .find(|k| k["chave"] == code)
            .unwrap_or_else(|| panic!("{code} missing from listing"))
    };
    assert_eq!(by_code(&older)["dispositivosAtivos"], 2);
    assert_eq!(by_code(&older)["nomeComprador"], "Primeira");
    assert_eq!(by_code(&newer)["dispositivosAtivos"], 0);
    assert_eq!(by_code(&newer)["maxDispositivos"], 2);
}

#[tokio::test]
async fn test_inspecting_an_unknown_key_is_404() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "GET",
            "/api/admin/ver/KG-2026-AAAA-BBBB-CCCC",
            None,
            Some(helpers::ADMIN_SECRET),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inspection_lists_bound_devices_with_their_names() {
    let app = helpers::TestApp::new().await;
    let code = app.generate_key("Iris", 3).await;

    let response = app
        .request(
            "POST",
            "/api/ativar",
            Some(json!({
                "chave": code,
                "fingerprint": "fp1",
                "nomeDispositivo": "Chrome Windows"
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let detail = app
        .request(
            "GET",
            &format!("/api/admin/ver/{code}"),
            None,
            Some(helpers::ADMIN_SECRET),
        )
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["chave"], code);
    assert_eq!(detail.body["ativa"], true);

    let devices = detail.body["dispositivos"].as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["fingerprint"], "fp1");
    assert_eq!(devices[0]["nome"], "Chrome Windows");
}

#[tokio::test]
async fn test_blocking_an_unknown_key_reports_failure() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/admin/bloquear",
            Some(json!({ "chave": "KG-2026-AAAA-BBBB-CCCC" })),
            Some(helpers::ADMIN_SECRET),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["sucesso"], false);
}

#[tokio::test]
async fn test_activation_endpoints_do_not_require_the_secret() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/status", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "online");
    assert!(response.body.get("timestamp").is_some());
}
