//! SSE chat endpoint.
//!
//! POST /api/chat/stream
//!
//! Validates the turn, then streams `data: {json}` events: one per model
//! fragment, then a single `done` or `error` event.

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{Stream, StreamExt};
use team_store::ChatStreamRequest;

use crate::kernel::stream_chat;
use crate::server::app::AxumAppState;
use crate::server::error::ApiError;

pub async fn chat_stream_handler(
    Extension(state): Extension<AxumAppState>,
    body: Result<Json<ChatStreamRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Json(request) = body?;
    let turn = request.validate()?;

    tracing::info!(
        agent_id = %turn.agent_id,
        role = %turn.role,
        history = turn.history.len(),
        "Chat stream requested"
    );

    let events = stream_chat(&state.server_deps, turn).filter_map(|event| async move {
        Event::default().json_data(&event).ok().map(Ok)
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
