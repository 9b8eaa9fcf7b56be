//! Team builder state: AI agents, human team members, and chat.
//!
//! Two observable stores ([`AgentStore`], [`TeamMemberStore`]) hold the
//! team and persist it through a [`KeyValueStorage`]. [`ChatController`]
//! sends chat turns to the streaming proxy through a [`ChatBackend`], which
//! in production is the HTTP [`ProxyClient`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use team_store::{AgentStore, FileStorage};
//!
//! let store = AgentStore::load(Arc::new(FileStorage::new(".team-data")));
//! let _sub = store.subscribe(|agents: &[team_store::Agent]| {
//!     println!("{} agents", agents.len());
//! });
//! store.create_standard_team("data-analysis");
//! ```

pub mod agent_store;
pub mod chat;
pub mod collection;
pub mod entity;
pub mod names;
pub mod observer;
mod persisted;
pub mod protocol;
pub mod proxy_client;
pub mod roles;
pub mod storage;
pub mod team_member_store;
pub mod templates;

pub use agent_store::{AgentStore, AgentUpdate, AGENT_STORAGE_KEY};
pub use chat::{ChatController, ChatError};
pub use collection::EntityCollection;
pub use entity::{Agent, Approver, Entity, Message, Sender, TeamMember, DEFAULT_TEMPERATURE};
pub use observer::{Listeners, StoreListener, Subscription};
pub use protocol::{AgentKey, ChatStreamEvent, ChatStreamRequest, ChatTurn, MissingFields, SseEventParser};
pub use proxy_client::{collect_reply, ChatBackend, EventStream, ProxyClient, ProxyError};
pub use roles::{AgentRole, TeamMemberRole, UnknownRole};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError, StorageResult};
pub use team_member_store::{TeamMemberStore, TEAM_MEMBER_STORAGE_KEY};
pub use templates::{find_template, TeamTemplate, STANDARD_TEAMS};
