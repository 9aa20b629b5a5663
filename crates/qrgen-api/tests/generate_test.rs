//! HTTP surface tests.
//!
//! Run with: `cargo test -p qrgen-api --test generate_test`

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use qrgen_api::setup::routes::setup_routes;
use qrgen_api::AppState;
use qrgen_core::{AppConfig, Config, PNG_DATA_URL_PREFIX};
use serde_json::{json, Value};
use tempfile::TempDir;

struct TestApp {
    server: TestServer,
    _public_dir: TempDir,
}

fn setup_test_app() -> TestApp {
    let public_dir = tempfile::tempdir().unwrap();
    std::fs::write(public_dir.path().join("index.html"), "<h1>qrgen</h1>").unwrap();

    let mut app_config = AppConfig::default();
    app_config.render.settle_delay = Duration::ZERO;
    app_config.base.public_dir = public_dir.path().to_string_lossy().into_owned();
    let config = Config(Box::new(app_config));

    let state = Arc::new(AppState::new(config.clone()));
    let router = setup_routes(&config, state).unwrap();
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        _public_dir: public_dir,
    }
}

#[tokio::test]
async fn test_generate_qr_returns_data_url() {
    let app = setup_test_app();
    let response = app
        .server
        .post("/generate")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let qr = body["qr"].as_str().unwrap();
    assert!(qr.starts_with(PNG_DATA_URL_PREFIX));
    assert!(qr.len() > PNG_DATA_URL_PREFIX.len());
}

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let app = setup_test_app();
    let response = app.server.post("/generate").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No URL provided");
}

#[tokio::test]
async fn test_empty_url_is_bad_request() {
    let app = setup_test_app();
    let response = app
        .server
        .post("/generate")
        .json(&json!({ "url": "" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No URL provided");
}

#[tokio::test]
async fn test_whitespace_url_is_bad_request() {
    let app = setup_test_app();
    let response = app
        .server
        .post("/generate")
        .json(&json!({ "url": "   " }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No URL provided");
}

#[tokio::test]
async fn test_qr_encoder_failure_is_server_error() {
    let app = setup_test_app();
    let response = app
        .server
        .post("/generate")
        .json(&json!({ "url": "x".repeat(8000) }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "QR code generation failed");
}

#[tokio::test]
async fn test_barcode_type_uses_same_response_key() {
    let app = setup_test_app();
    let response = app
        .server
        .post("/generate")
        .json(&json!({ "url": "hello", "type": "CODE128" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["qr"].as_str().unwrap().starts_with(PNG_DATA_URL_PREFIX));
}

#[tokio::test]
async fn test_invalid_barcode_content_reports_format() {
    let app = setup_test_app();
    let response = app
        .server
        .post("/generate")
        .json(&json!({ "url": "ABC!!", "type": "EAN13" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("EAN13"));
}

#[tokio::test]
async fn test_unknown_type_is_bad_request() {
    let app = setup_test_app();
    let response = app
        .server
        .post("/generate")
        .json(&json!({ "url": "hello", "type": "datamatrix" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_version() {
    let app = setup_test_app();
    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_static_files_are_served() {
    let app = setup_test_app();
    let response = app.server.get("/index.html").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("qrgen"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup_test_app();
    let response = app.server.get("/api/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["paths"]["/generate"].is_object());
}
