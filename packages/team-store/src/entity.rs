//! Records managed by the stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temperature given to new agents.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Anything a store can hold: it only needs a stable integer id.
pub trait Entity: Clone + Send + Sync + 'static {
    fn id(&self) -> u64;
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
    System,
}

/// One entry of an agent's conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Set while the text is still being streamed in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp: Utc::now(),
            streaming: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Sender::Agent, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Sender::System, text)
    }
}

/// An AI agent on the team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: u64,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub conversation_history: Vec<Message>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl Entity for Agent {
    fn id(&self) -> u64 {
        self.id
    }
}

/// A human team member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for TeamMember {
    fn id(&self) -> u64 {
        self.id
    }
}

/// The human who signs off on the team's work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub id: String,
    pub name: String,
}

impl Default for Approver {
    fn default() -> Self {
        Self {
            id: "human-approver".to_string(),
            name: "You".to_string(),
        }
    }
}

/// Resolve a display name: trimmed custom name, or the role when blank.
pub(crate) fn display_name(role: &str, custom: Option<&str>) -> String {
    match custom.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => role.to_string(),
    }
}

/// Trimmed name, or `None` when nothing is left.
pub(crate) fn valid_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
