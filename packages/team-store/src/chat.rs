//! Chat panel controller: which agent is open, and sending turns to it.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{info, warn};

use crate::agent_store::AgentStore;
use crate::entity::{Agent, Message};
use crate::observer::{lock, Subscription};
use crate::protocol::ChatStreamRequest;
use crate::proxy_client::{collect_reply, ChatBackend, ProxyError};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No agent selected")]
    NoSelection,

    #[error("Agent {0} not found")]
    AgentNotFound(u64),

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Agent {0} is still responding")]
    Busy(u64),

    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

/// Tracks the selected agent and runs chat turns against a [`ChatBackend`].
///
/// The selection is cleared automatically when the selected agent leaves the
/// store.
pub struct ChatController {
    store: Arc<AgentStore>,
    backend: Arc<dyn ChatBackend>,
    selected: Arc<Mutex<Option<u64>>>,
    in_flight: Mutex<HashSet<u64>>,
    subscription: Subscription,
}

impl ChatController {
    pub fn new(store: Arc<AgentStore>, backend: Arc<dyn ChatBackend>) -> Self {
        let selected = Arc::new(Mutex::new(None));

        let watched = Arc::clone(&selected);
        let subscription = store.subscribe(move |agents: &[Agent]| {
            let mut selected = lock(&watched);
            if let Some(id) = *selected {
                if !agents.iter().any(|a| a.id == id) {
                    *selected = None;
                }
            }
        });

        Self {
            store,
            backend,
            selected,
            in_flight: Mutex::new(HashSet::new()),
            subscription,
        }
    }

    /// Open the chat for an agent. Unknown ids leave the selection unchanged.
    pub fn select(&self, agent_id: u64) -> bool {
        if self.store.agent(agent_id).is_none() {
            return false;
        }
        *lock(&self.selected) = Some(agent_id);
        true
    }

    pub fn selected(&self) -> Option<u64> {
        *lock(&self.selected)
    }

    pub fn selected_agent(&self) -> Option<Agent> {
        self.selected().and_then(|id| self.store.agent(id))
    }

    pub fn clear_selection(&self) {
        *lock(&self.selected) = None;
    }

    /// Drop the selection if it points at `agent_id`.
    pub fn handle_agent_removed(&self, agent_id: u64) {
        let mut selected = lock(&self.selected);
        if *selected == Some(agent_id) {
            *selected = None;
        }
    }

    pub fn is_busy(&self, agent_id: u64) -> bool {
        lock(&self.in_flight).contains(&agent_id)
    }

    /// Send `text` to the selected agent.
    pub async fn send(&self, text: &str, on_chunk: impl FnMut(&str)) -> Result<String, ChatError> {
        let agent_id = self.selected().ok_or(ChatError::NoSelection)?;
        self.send_to(agent_id, text, on_chunk).await
    }

    /// Run one turn: record the user message, stream the reply, then record
    /// the agent's answer or a system message describing the failure.
    pub async fn send_to(
        &self,
        agent_id: u64,
        text: &str,
        on_chunk: impl FnMut(&str),
    ) -> Result<String, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let agent = self
            .store
            .agent(agent_id)
            .ok_or(ChatError::AgentNotFound(agent_id))?;
        let _guard = InFlight::acquire(&self.in_flight, agent_id)?;

        // The request carries the history as it was before this turn.
        let request = ChatStreamRequest::for_agent(&agent, text);
        self.store
            .add_to_conversation_history(agent_id, Message::user(text));

        let result = match self.backend.stream_chat(request).await {
            Ok(events) => collect_reply(events, on_chunk).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(reply) => {
                info!(agent_id, reply_len = reply.len(), "Agent replied");
                self.store
                    .add_to_conversation_history(agent_id, Message::agent(reply.as_str()));
                Ok(reply)
            }
            Err(e) => {
                warn!(agent_id, error = %e, "Chat turn failed");
                self.store
                    .add_to_conversation_history(agent_id, Message::system(format!("Error: {}", e)));
                Err(e.into())
            }
        }
    }
}

impl Drop for ChatController {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

/// Marks an agent busy until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<u64>>,
    agent_id: u64,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a Mutex<HashSet<u64>>, agent_id: u64) -> Result<Self, ChatError> {
        if !lock(set).insert(agent_id) {
            return Err(ChatError::Busy(agent_id));
        }
        Ok(Self { set, agent_id })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.agent_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Sender;
    use crate::protocol::ChatStreamEvent;
    use crate::proxy_client::EventStream;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use futures::{stream, StreamExt};
    use tokio::sync::Notify;

    /// Replays scripted events and records every request.
    struct ScriptedBackend {
        events: Vec<ChatStreamEvent>,
        requests: Mutex<Vec<ChatStreamRequest>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedBackend {
        fn new(events: Vec<ChatStreamEvent>) -> Self {
            Self {
                events,
                requests: Mutex::new(Vec::new()),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn stream_chat(&self, request: ChatStreamRequest) -> Result<EventStream, ProxyError> {
            self.requests.lock().unwrap().push(request);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(stream::iter(self.events.clone().into_iter().map(Ok)).boxed())
        }
    }

    fn hello_events() -> Vec<ChatStreamEvent> {
        vec![
            ChatStreamEvent::Chunk {
                chunk: "Hel".into(),
                full_response: "Hel".into(),
            },
            ChatStreamEvent::Chunk {
                chunk: "lo".into(),
                full_response: "Hello".into(),
            },
            ChatStreamEvent::Done {
                full_response: "Hello".into(),
            },
        ]
    }

    fn setup(events: Vec<ChatStreamEvent>) -> (Arc<AgentStore>, Arc<ScriptedBackend>, ChatController) {
        let store = Arc::new(AgentStore::load(Arc::new(MemoryStorage::new())));
        let backend = Arc::new(ScriptedBackend::new(events));
        let controller = ChatController::new(Arc::clone(&store), backend.clone());
        (store, backend, controller)
    }

    #[tokio::test]
    async fn test_send_records_both_sides() {
        let (store, backend, controller) = setup(hello_events());
        let agent = store.add_agent("Architect", None);
        assert!(controller.select(agent.id));

        let mut streamed = String::new();
        let reply = controller
            .send("  design a schema ", |c| streamed.push_str(c))
            .await
            .unwrap();

        assert_eq!(reply, "Hello");
        assert_eq!(streamed, "Hello");

        let history = store.conversation_history(agent.id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[0].text, "design a schema");
        assert_eq!(history[1].sender, Sender::Agent);
        assert_eq!(history[1].text, "Hello");

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].role.as_deref(), Some("Architect"));
        assert!(requests[0].conversation_history.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_recorded_as_system_message() {
        let (store, _backend, controller) = setup(vec![ChatStreamEvent::Error {
            error: "Vertex AI request failed: quota".into(),
        }]);
        let agent = store.add_agent("Data Analyst", None);

        let err = controller.send_to(agent.id, "hi", |_| {}).await.unwrap_err();
        assert!(matches!(err, ChatError::Proxy(ProxyError::Upstream(_))));

        let history = store.conversation_history(agent.id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].sender, Sender::System);
        assert!(history[1].text.contains("quota"));
        assert!(!controller.is_busy(agent.id));
    }

    #[tokio::test]
    async fn test_rejects_empty_and_unselected() {
        let (store, backend, controller) = setup(hello_events());
        let agent = store.add_agent("Architect", None);

        assert!(matches!(controller.send("hi", |_| {}).await, Err(ChatError::NoSelection)));
        controller.select(agent.id);
        assert!(matches!(controller.send("   ", |_| {}).await, Err(ChatError::EmptyMessage)));
        assert!(!controller.select(agent.id + 1));
        assert_eq!(controller.selected(), Some(agent.id));

        assert!(backend.requests.lock().unwrap().is_empty());
        assert!(store.conversation_history(agent.id).is_empty());
    }

    #[tokio::test]
    async fn test_second_send_while_streaming_is_busy() {
        let store = Arc::new(AgentStore::load(Arc::new(MemoryStorage::new())));
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(ScriptedBackend {
            gate: Some(Arc::clone(&gate)),
            ..ScriptedBackend::new(hello_events())
        });
        let controller = ChatController::new(Arc::clone(&store), backend.clone());
        let agent = store.add_agent("Architect", None);

        let first = controller.send_to(agent.id, "one", |_| {});
        let second = async {
            tokio::task::yield_now().await;
            let result = controller.send_to(agent.id, "two", |_| {}).await;
            gate.notify_one();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first.unwrap(), "Hello");
        assert!(matches!(second, Err(ChatError::Busy(id)) if id == agent.id));
        assert_eq!(backend.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_selection_cleared_when_agent_removed() {
        let (store, _backend, controller) = setup(Vec::new());
        let a = store.add_agent("Architect", None);
        let b = store.add_agent("Data Engineer", None);

        controller.select(a.id);
        store.remove_agent(b.id);
        assert_eq!(controller.selected(), Some(a.id));

        store.remove_agent(a.id);
        assert_eq!(controller.selected(), None);

        controller.select(b.id);
        assert_eq!(controller.selected(), None);
    }

    #[test]
    fn test_handle_agent_removed_only_matches_selection() {
        let (store, _backend, controller) = setup(Vec::new());
        let a = store.add_agent("Architect", None);

        controller.select(a.id);
        controller.handle_agent_removed(a.id + 1);
        assert_eq!(controller.selected(), Some(a.id));
        controller.handle_agent_removed(a.id);
        assert_eq!(controller.selected(), None);
    }
}
