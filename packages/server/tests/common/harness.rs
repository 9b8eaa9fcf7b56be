//! Test harness driving the router in-process.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so no port is bound.
//! The model is a `MockModelFactory`; keep a clone to inspect its calls.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use server_core::kernel::{MockModelFactory, ModelCache, ServerDeps};
use server_core::server::build_app;
use std::sync::Arc;
use team_store::{ChatStreamEvent, SseEventParser};
use tower::ServiceExt;

pub const SERVICE_NAME: &str = "team-chat-proxy-test";

pub struct TestHarness {
    pub app: Router,
    pub factory: MockModelFactory,
    pub cache: ModelCache,
}

impl TestHarness {
    pub fn new(factory: MockModelFactory) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let cache = ModelCache::new();
        let deps = ServerDeps::new(Arc::new(factory.clone()), cache.clone());
        let app = build_app(
            deps,
            SERVICE_NAME,
            &["http://localhost:8080".to_string()],
        );

        Self {
            app,
            factory,
            cache,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>, Option<String>) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable")
            .to_vec();

        (status, body, content_type)
    }

    pub async fn post_chat(&self, body: serde_json::Value) -> (StatusCode, Vec<u8>, Option<String>) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/chat/stream")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn delete(&self, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(request).await.0
    }
}

/// Decode an SSE body into wire events.
pub fn parse_events(body: &[u8]) -> Vec<ChatStreamEvent> {
    let mut parser = SseEventParser::new();
    let mut events = parser.push(body);
    events.extend(parser.finish());
    events
}

pub fn json_body(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).expect("body should be JSON")
}
