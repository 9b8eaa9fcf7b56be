//! One streamed chat turn, framed as wire events.
//!
//! The stream always ends with exactly one terminal event: `Done` with the
//! whole reply, or `Error` with the failure. Fragments before a failure are
//! still delivered.

use futures::{Stream, StreamExt};
use gemini_client::Content;
use team_store::{ChatStreamEvent, ChatTurn, Message, Sender};
use tracing::{info, warn};

use super::ServerDeps;

/// Convert stored messages to model turns: user messages stay `user`,
/// everything else (agent replies, system notices) becomes `model`.
pub fn history_to_contents(history: &[Message]) -> Vec<Content> {
    history
        .iter()
        .map(|msg| match msg.sender {
            Sender::User => Content::user(msg.text.clone()),
            Sender::Agent | Sender::System => Content::model(msg.text.clone()),
        })
        .collect()
}

/// Run a validated turn against the agent's cached model.
pub fn stream_chat(deps: &ServerDeps, turn: ChatTurn) -> impl Stream<Item = ChatStreamEvent> + Send + 'static {
    let factory = deps.model_factory.clone();
    let cache = deps.model_cache.clone();

    async_stream::stream! {
        let agent_id = turn.agent_id.to_string();

        let model = match cache
            .get_or_create(&agent_id, factory.as_ref(), &turn.role, turn.temperature)
            .await
        {
            Ok(model) => model,
            Err(e) => {
                warn!(agent_id = %agent_id, error = %e, "Failed to build model");
                yield ChatStreamEvent::Error { error: e.to_string() };
                return;
            }
        };

        let history = history_to_contents(&turn.history);
        let mut fragments = match model.stream_reply(history, &turn.message).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!(agent_id = %agent_id, error = %e, "Model request failed");
                yield ChatStreamEvent::Error { error: e.to_string() };
                return;
            }
        };

        let mut full_response = String::new();
        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(text) if text.is_empty() => continue,
                Ok(text) => {
                    full_response.push_str(&text);
                    yield ChatStreamEvent::Chunk {
                        chunk: text,
                        full_response: full_response.clone(),
                    };
                }
                Err(e) => {
                    warn!(agent_id = %agent_id, error = %e, "Model stream failed");
                    yield ChatStreamEvent::Error { error: e.to_string() };
                    return;
                }
            }
        }

        info!(agent_id = %agent_id, reply_len = full_response.len(), "Chat turn complete");
        yield ChatStreamEvent::Done { full_response };
    }
}
