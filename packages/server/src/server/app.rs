//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    chat_stream_handler, clear_agent_models_handler, clear_models_handler, health_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub server_deps: Arc<ServerDeps>,
    pub service_name: Arc<str>,
}

/// Build the Axum application router
///
/// `allowed_origins` entries that are not valid header values are skipped
/// with a warning.
pub fn build_app(server_deps: ServerDeps, service_name: &str, allowed_origins: &[String]) -> Router {
    let app_state = AxumAppState {
        server_deps: Arc::new(server_deps),
        service_name: Arc::from(service_name),
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat/stream", post(chat_stream_handler))
        .route("/api/models", delete(clear_models_handler))
        .route("/api/models/:agent_id", delete(clear_agent_models_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
