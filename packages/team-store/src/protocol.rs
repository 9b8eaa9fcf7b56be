//! Wire format shared by the chat proxy and its clients.
//!
//! Request: `POST /api/chat/stream` with a JSON [`ChatStreamRequest`].
//! Response: `text/event-stream`, each event a `data: <json>` line holding
//! one [`ChatStreamEvent`]:
//!
//! - `{"chunk": "...", "fullResponse": "..."}` partial text
//! - `{"done": true, "fullResponse": "..."}` terminal marker
//! - `{"error": "..."}` failure, always the last event

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::entity::{Agent, Message, DEFAULT_TEMPERATURE};

/// Agent identifier as sent by clients: numeric store ids or opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentKey {
    Id(u64),
    Name(String),
}

impl AgentKey {
    /// `0` and `""` count as absent.
    fn is_blank(&self) -> bool {
        match self {
            AgentKey::Id(id) => *id == 0,
            AgentKey::Name(name) => name.trim().is_empty(),
        }
    }
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKey::Id(id) => write!(f, "{}", id),
            AgentKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for AgentKey {
    fn from(id: u64) -> Self {
        AgentKey::Id(id)
    }
}

/// Body of `POST /api/chat/stream`. Every field is optional on the wire so
/// missing ones can be reported instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStreamRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatStreamRequest {
    /// A request for `message` carrying the agent's role, history and temperature.
    pub fn for_agent(agent: &Agent, message: impl Into<String>) -> Self {
        Self {
            agent_id: Some(AgentKey::Id(agent.id)),
            role: Some(agent.role.clone()),
            message: Some(message.into()),
            conversation_history: agent.conversation_history.clone(),
            temperature: Some(agent.temperature),
        }
    }

    /// Check required fields and apply defaults.
    pub fn validate(self) -> Result<ChatTurn, MissingFields> {
        let agent_id = self.agent_id.filter(|k| !k.is_blank());
        let role = self.role.filter(|r| !r.trim().is_empty());
        let message = self.message.filter(|m| !m.trim().is_empty());

        match (agent_id, role, message) {
            (Some(agent_id), Some(role), Some(message)) => Ok(ChatTurn {
                agent_id,
                role,
                message,
                history: self.conversation_history,
                temperature: self
                    .temperature
                    .filter(|t| t.is_finite())
                    .unwrap_or(DEFAULT_TEMPERATURE)
                    .clamp(0.0, 1.0),
            }),
            _ => Err(MissingFields),
        }
    }
}

/// A validated chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub agent_id: AgentKey,
    pub role: String,
    pub message: String,
    pub history: Vec<Message>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Missing required fields: agentId, role, and message are required")]
pub struct MissingFields;

/// One unit on the response stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent", into = "RawEvent")]
pub enum ChatStreamEvent {
    /// A fragment plus everything received so far.
    Chunk { chunk: String, full_response: String },
    /// The model finished; carries the whole reply.
    Done { full_response: String },
    /// The call failed; nothing follows.
    Error { error: String },
}

impl ChatStreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChatStreamEvent::Chunk { .. })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chunk: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    full_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<RawEvent> for ChatStreamEvent {
    type Error = String;

    fn try_from(raw: RawEvent) -> Result<Self, String> {
        if let Some(error) = raw.error {
            return Ok(ChatStreamEvent::Error { error });
        }
        if raw.done {
            return Ok(ChatStreamEvent::Done {
                full_response: raw.full_response.unwrap_or_default(),
            });
        }
        match raw.chunk {
            Some(chunk) => Ok(ChatStreamEvent::Chunk {
                full_response: raw.full_response.unwrap_or_else(|| chunk.clone()),
                chunk,
            }),
            None => Err("event has none of chunk, done or error".to_string()),
        }
    }
}

impl From<ChatStreamEvent> for RawEvent {
    fn from(event: ChatStreamEvent) -> Self {
        match event {
            ChatStreamEvent::Chunk {
                chunk,
                full_response,
            } => RawEvent {
                chunk: Some(chunk),
                full_response: Some(full_response),
                ..Default::default()
            },
            ChatStreamEvent::Done { full_response } => RawEvent {
                done: true,
                full_response: Some(full_response),
                ..Default::default()
            },
            ChatStreamEvent::Error { error } => RawEvent {
                error: Some(error),
                ..Default::default()
            },
        }
    }
}

/// Incremental decoder for `data:` lines of an SSE body.
///
/// Bytes are buffered until a newline arrives, so events split across
/// network reads (or multi-byte characters split across reads) decode
/// correctly. Lines that do not decode are logged and skipped.
#[derive(Debug, Default)]
pub struct SseEventParser {
    buffer: Vec<u8>,
}

impl SseEventParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes; returns every event completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<ChatStreamEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = decode_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a final line that arrived without a trailing newline.
    pub fn finish(&mut self) -> Vec<ChatStreamEvent> {
        let line = std::mem::take(&mut self.buffer);
        decode_line(&line).into_iter().collect()
    }
}

fn decode_line(line: &[u8]) -> Option<ChatStreamEvent> {
    let line = match std::str::from_utf8(line) {
        Ok(line) => line.trim(),
        Err(e) => {
            warn!(error = %e, "Skipping SSE line with invalid UTF-8");
            return None;
        }
    };

    let data = line.strip_prefix("data:")?.trim();
    match serde_json::from_str(data) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, data = %preview(data), "Skipping undecodable SSE event");
            None
        }
    }
}

/// First 200 characters of a payload, for log lines.
fn preview(data: &str) -> &str {
    data.char_indices().nth(200).map_or(data, |(i, _)| &data[..i])
}
