//! Integration tests for the `/api/v1/config` endpoints.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};

use common::{acme_record, body_json, build_test_app, send, CountingDirectory};
use tenantgate_core::params;

// ---------------------------------------------------------------------------
// Test: POST /config/regenerate succeeds for a known tenant host
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regenerate_returns_success_payload() {
    let directory = Arc::new(CountingDirectory::new(vec![acme_record()]));
    let (dir, app) = build_test_app(directory);

    let response = send(
        app,
        Method::POST,
        "/api/v1/config/regenerate",
        Some("acme.example.com"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Config regenerated successfully");
    assert_eq!(json["tenant"], "acme");
    assert!(json["config_path"]
        .as_str()
        .unwrap()
        .ends_with("local-acme.php"));

    assert!(dir.path().join("local-acme.php").exists());
}

// ---------------------------------------------------------------------------
// Test: unrecognized host -> 400 with the contract error body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regenerate_rejects_unrecognized_host() {
    let directory = Arc::new(CountingDirectory::new(vec![acme_record()]));
    let (dir, app) = build_test_app(directory);

    let response = send(
        app,
        Method::POST,
        "/api/v1/config/regenerate",
        Some("localhost:3000"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No tenant found in host");
    assert!(!dir.path().join("local-localhost.php").exists());
}

// ---------------------------------------------------------------------------
// Test: unknown tenant -> 404, no artifact written
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regenerate_unknown_tenant_is_404() {
    let directory = Arc::new(CountingDirectory::new(vec![acme_record()]));
    let (dir, app) = build_test_app(directory);

    let response = send(
        app,
        Method::POST,
        "/api/v1/config/regenerate",
        Some("ghost.example.com"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No tenant found for host: ghost.example.com");
    assert!(!dir.path().join("local-ghost.php").exists());
}

// ---------------------------------------------------------------------------
// Test: regeneration preserves the existing secret key
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regenerate_twice_keeps_secret_key() {
    let directory = Arc::new(CountingDirectory::new(vec![acme_record()]));
    let (dir, app) = build_test_app(directory);

    let first = send(
        app.clone(),
        Method::POST,
        "/api/v1/config/regenerate",
        Some("acme.example.com"),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let artifact = dir.path().join("local-acme.php");
    let before = params::parse(&std::fs::read_to_string(&artifact).unwrap()).unwrap();

    let second = send(
        app,
        Method::POST,
        "/api/v1/config/regenerate",
        Some("acme.example.com"),
    )
    .await;
    assert_eq!(second.status(), StatusCode::OK);

    let after = params::parse(&std::fs::read_to_string(&artifact).unwrap()).unwrap();
    assert_eq!(before["secret_key"], after["secret_key"]);
}

// ---------------------------------------------------------------------------
// Test: directory outage surfaces as 500 with an error body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regenerate_directory_outage_is_500() {
    let directory = Arc::new(CountingDirectory::down());
    let (_dir, app) = build_test_app(directory);

    let response = send(
        app,
        Method::POST,
        "/api/v1/config/regenerate",
        Some("acme.example.com"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Tenant directory unavailable"));
}

// ---------------------------------------------------------------------------
// Test: GET /config/resolve provisions once, then reports cache hits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolve_provisions_then_hits_cache() {
    let directory = Arc::new(CountingDirectory::new(vec![acme_record()]));
    let (_dir, app) = build_test_app(Arc::clone(&directory));

    let first = send(
        app.clone(),
        Method::GET,
        "/api/v1/config/resolve",
        Some("acme.example.com"),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let json = body_json(first).await;
    assert_eq!(json["outcome"], "provisioned");
    assert_eq!(json["tenant"], "acme");

    let second = send(
        app,
        Method::GET,
        "/api/v1/config/resolve",
        Some("acme.example.com"),
    )
    .await;
    let json = body_json(second).await;
    assert_eq!(json["outcome"], "cache_hit");

    assert_eq!(directory.lookup_count(), 1);
}

// ---------------------------------------------------------------------------
// Test: resolve falls back to the default config for tenant-less hosts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolve_without_tenant_returns_default() {
    let directory = Arc::new(CountingDirectory::new(vec![acme_record()]));
    let (_dir, app) = build_test_app(Arc::clone(&directory));

    let response = send(
        app,
        Method::GET,
        "/api/v1/config/resolve",
        Some("localhost"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["outcome"], "default");
    assert_eq!(json["tenant"], serde_json::Value::Null);
    assert!(json["config_path"].as_str().unwrap().ends_with("local.php"));
    assert_eq!(directory.lookup_count(), 0);
}
