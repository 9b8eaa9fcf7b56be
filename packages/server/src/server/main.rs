// Main entry point for the chat proxy

use anyhow::{Context, Result};
use server_core::kernel::{GeminiModelFactory, ModelCache, ServerDeps};
use server_core::{server::build_app, Config, GeminiAuth};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting team chat proxy");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    match &config.gemini_auth {
        GeminiAuth::ApiKey(_) => tracing::info!(model = %config.model_name, "Using Gemini API"),
        GeminiAuth::Vertex {
            project_id,
            location,
            ..
        } => tracing::info!(
            model = %config.model_name,
            project = %project_id,
            location = %location,
            "Using Vertex AI"
        ),
    }

    let factory = GeminiModelFactory::from_auth(&config.gemini_auth, config.model_name.clone());
    let server_deps = ServerDeps::new(Arc::new(factory), ModelCache::new());

    // Build application
    let app = build_app(server_deps, &config.service_name, &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);
    tracing::info!(origins = ?config.allowed_origins, "CORS origins");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
