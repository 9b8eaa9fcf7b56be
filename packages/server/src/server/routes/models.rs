//! Model cache administration.
//!
//! DELETE /api/models            drop every cached model
//! DELETE /api/models/:agent_id  drop one agent's models

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
};

use crate::server::app::AxumAppState;

pub async fn clear_models_handler(Extension(state): Extension<AxumAppState>) -> StatusCode {
    let removed = state.server_deps.model_cache.clear_all().await;
    tracing::info!(removed, "Cleared all cached models");
    StatusCode::NO_CONTENT
}

pub async fn clear_agent_models_handler(
    Extension(state): Extension<AxumAppState>,
    Path(agent_id): Path<String>,
) -> StatusCode {
    let removed = state.server_deps.model_cache.clear(&agent_id).await;
    tracing::info!(agent_id = %agent_id, removed, "Cleared cached models for agent");
    StatusCode::NO_CONTENT
}
