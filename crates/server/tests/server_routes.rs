//! Route-level tests for the liveness, status, config and audit endpoints.

mod common;

use axum::http::StatusCode;
use common::TestServer;

#[tokio::test]
async fn test_root_returns_liveness_line() {
    let server = TestServer::new();

    let (status, body) = server.get_text("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "✅ Bot de Pagamentos Unibot está rodando com sucesso!");
}

#[tokio::test]
async fn test_status_reports_online_with_version() {
    let server = TestServer::new();

    let (status, body) = server.get("/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "online");
    assert_eq!(body["bot"], "Unibot Pagamentos");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_config_redacts_secrets() {
    let server = TestServer::new();

    let (status, body) = server.get("/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chat"]["bot_token_configured"], true);
    assert_eq!(body["store"]["api_key_configured"], true);

    let raw = body.to_string();
    assert!(!raw.contains("test-token"));
    assert!(!raw.contains("test-key"));
}

#[tokio::test]
async fn test_audit_endpoint_returns_empty_page() {
    let server = TestServer::new();

    let (status, body) = server.get("/audit?limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["limit"], 5);
    assert!(body["events"].as_array().unwrap().is_empty());
}
