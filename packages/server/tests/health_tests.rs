//! Integration tests for GET /health and CORS.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::*;
use serde_json::json;
use server_core::kernel::MockModelFactory;
use tower::ServiceExt;

#[tokio::test]
async fn health_reports_service_name() {
    let harness = TestHarness::new(MockModelFactory::new("flash"));

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body, _) = harness.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"status": "ok", "service": SERVICE_NAME}));
}

async fn allowed_origin(harness: &TestHarness, origin: &str) -> Option<String> {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/chat/stream")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = harness.app.clone().oneshot(request).await.unwrap();
    response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

#[tokio::test]
async fn cors_allows_configured_origin_only() {
    let harness = TestHarness::new(MockModelFactory::new("flash"));

    assert_eq!(
        allowed_origin(&harness, "http://localhost:8080").await.as_deref(),
        Some("http://localhost:8080")
    );
    assert!(allowed_origin(&harness, "http://evil.example").await.is_none());
}
