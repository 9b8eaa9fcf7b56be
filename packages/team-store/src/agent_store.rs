//! Agent store - single source of truth for the agents on a team.
//!
//! Every successful mutation persists the full state under one storage key
//! and then notifies subscribers with a snapshot. Reads always return copies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collection::EntityCollection;
use crate::entity::{display_name, valid_name, Agent, Approver, Message, DEFAULT_TEMPERATURE};
use crate::names;
use crate::observer::{StoreListener, Subscription};
use crate::persisted::{PersistedStore, StoreState};
use crate::roles::AgentRole;
use crate::storage::KeyValueStorage;
use crate::templates::{self, TeamTemplate, STANDARD_TEAMS};

/// Storage slot used by [`AgentStore::load`].
pub const AGENT_STORAGE_KEY: &str = "team-builder-agents";

/// Fields a caller may change on an existing agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub temperature: Option<f32>,
}

impl AgentUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn temperature(temperature: f32) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.temperature.is_none()
    }
}

/// Persisted layout: `{agents, nextId, approver, activeTemplateId}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedAgents {
    #[serde(default)]
    agents: Vec<Agent>,
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default)]
    approver: Option<Approver>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active_template_id: Option<String>,
}

fn first_id() -> u64 {
    1
}

#[derive(Debug, Default)]
struct AgentState {
    agents: EntityCollection<Agent>,
    approver: Approver,
    active_template_id: Option<String>,
}

impl AgentState {
    fn from_persisted(persisted: PersistedAgents) -> Self {
        let agents = persisted
            .agents
            .into_iter()
            .map(|mut agent| {
                agent.temperature = clamp_temperature(agent.temperature);
                agent
            })
            .collect();

        Self {
            agents: EntityCollection::from_parts(agents, persisted.next_id),
            approver: persisted.approver.unwrap_or_default(),
            active_template_id: persisted.active_template_id,
        }
    }

    fn to_persisted(&self) -> PersistedAgents {
        PersistedAgents {
            agents: self.agents.snapshot(),
            next_id: self.agents.next_id(),
            approver: Some(self.approver.clone()),
            active_template_id: self.active_template_id.clone(),
        }
    }

    fn push_agent(&mut self, role: &str, name: Option<&str>) -> Agent {
        let agent = Agent {
            id: self.agents.allocate_id(),
            name: display_name(role, name),
            role: role.to_string(),
            conversation_history: Vec::new(),
            temperature: DEFAULT_TEMPERATURE,
        };
        self.agents.push(agent.clone());
        agent
    }
}

impl StoreState for AgentState {
    type Item = Agent;
    const LABEL: &'static str = "agents";

    fn decode(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<PersistedAgents>(raw).map(Self::from_persisted)
    }

    fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_persisted())
    }

    fn snapshot(&self) -> Vec<Agent> {
        self.agents.snapshot()
    }
}

fn clamp_temperature(t: f32) -> f32 {
    if t.is_nan() {
        DEFAULT_TEMPERATURE
    } else {
        t.clamp(0.0, 1.0)
    }
}

fn valid_temperature(t: f32) -> bool {
    t.is_finite() && (0.0..=1.0).contains(&t)
}

/// Observable, persisted collection of agents plus the team's approver.
pub struct AgentStore {
    inner: PersistedStore<AgentState>,
}

impl AgentStore {
    /// Load the store from [`AGENT_STORAGE_KEY`].
    ///
    /// A missing or unreadable slot yields an empty store; this never fails.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::load_with_key(storage, AGENT_STORAGE_KEY)
    }

    /// Load the store from a custom storage slot.
    pub fn load_with_key(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let inner = PersistedStore::<AgentState>::load(storage, key.into());

        inner.read(|state| {
            debug!(
                agents = state.agents.len(),
                next_id = state.agents.next_id(),
                "Agent store loaded"
            )
        });

        Self { inner }
    }

    /// Register a listener called with the full agent list after every mutation.
    ///
    /// Snapshots are delivered in mutation order. When several threads
    /// mutate at once, one of them delivers every queued snapshot, so a
    /// mutating call can return before listeners have seen its change.
    pub fn subscribe(&self, listener: impl StoreListener<Agent> + 'static) -> Subscription {
        self.inner.subscribe(listener)
    }

    // =========================================================================
    // Agents
    // =========================================================================

    /// Add an agent. The name defaults to the role when blank or absent.
    ///
    /// The role is stored as given; checking it against [`AgentStore::roles`]
    /// is up to the caller.
    pub fn add_agent(&self, role: &str, name: Option<&str>) -> Agent {
        let agent = self.inner.apply(|state| state.push_agent(role, name));
        info!(agent_id = agent.id, role = %agent.role, "Agent added");
        agent
    }

    /// Remove an agent. Returns `false` (and notifies nobody) if it does not exist.
    pub fn remove_agent(&self, id: u64) -> bool {
        let removed = self.inner.mutate(|state| state.agents.remove(id)).is_some();
        if removed {
            info!(agent_id = id, "Agent removed");
        }
        removed
    }

    /// Apply an update after validating every provided field.
    ///
    /// Rejected (returns `false`, nothing changes) when the agent is missing,
    /// the update is empty, the name is blank, or the temperature is outside
    /// `[0, 1]`.
    pub fn update_agent(&self, id: u64, update: AgentUpdate) -> bool {
        if update.is_empty() {
            return false;
        }

        let name = match update.name.as_deref() {
            Some(raw) => match valid_name(raw) {
                Some(name) => Some(name),
                None => return false,
            },
            None => None,
        };

        if let Some(t) = update.temperature {
            if !valid_temperature(t) {
                debug!(agent_id = id, temperature = t, "Rejected temperature update");
                return false;
            }
        }

        self.inner.mutate(|state| {
            let agent = state.agents.get_mut(id)?;
            if let Some(name) = name {
                agent.name = name;
            }
            if let Some(t) = update.temperature {
                agent.temperature = t;
            }
            Some(())
        })
        .is_some()
    }

    pub fn update_agent_name(&self, id: u64, name: &str) -> bool {
        self.update_agent(id, AgentUpdate::name(name))
    }

    pub fn update_agent_temperature(&self, id: u64, temperature: f32) -> bool {
        self.update_agent(id, AgentUpdate::temperature(temperature))
    }

    /// Snapshot of all agents in insertion order.
    pub fn agents(&self) -> Vec<Agent> {
        self.inner.read(|state| state.agents.snapshot())
    }

    pub fn agent(&self, id: u64) -> Option<Agent> {
        self.inner.read(|state| state.agents.get(id).cloned())
    }

    pub fn roles(&self) -> Vec<&'static str> {
        AgentRole::ALL.iter().map(AgentRole::as_str).collect()
    }

    /// Remove every agent and forget the active template.
    ///
    /// The id counter keeps running, so ids are not reused afterwards.
    pub fn clear_all_agents(&self) {
        self.inner.apply(|state| {
            state.agents.clear();
            state.active_template_id = None;
        });
        info!("All agents cleared");
    }

    /// Random pool name not used by any current agent.
    pub fn suggested_name(&self) -> &'static str {
        self.inner.read(|state| {
            names::suggest_name(
                state.agents.as_slice().iter().map(|a| a.name.as_str()),
                &mut rand::thread_rng(),
            )
        })
    }

    // =========================================================================
    // Approver
    // =========================================================================

    pub fn approver(&self) -> Approver {
        self.inner.read(|state| state.approver.clone())
    }

    pub fn update_approver_name(&self, name: &str) -> bool {
        let Some(name) = valid_name(name) else {
            return false;
        };
        self.inner.mutate(|state| {
            state.approver.name = name;
            Some(())
        })
        .is_some()
    }

    // =========================================================================
    // Team templates
    // =========================================================================

    pub fn standard_teams(&self) -> &'static [TeamTemplate] {
        STANDARD_TEAMS
    }

    /// Replace the team with one agent per template role, each given a
    /// distinct suggested name. Unknown template ids change nothing.
    pub fn create_standard_team(&self, template_id: &str) -> bool {
        let Some(template) = templates::find_template(template_id) else {
            warn!(template_id = %template_id, "Unknown team template");
            return false;
        };

        let mut rng = rand::thread_rng();
        self.inner.apply(|state| {
            state.agents.clear();
            for role in template.roles {
                let name = names::suggest_name(
                    state.agents.as_slice().iter().map(|a| a.name.as_str()),
                    &mut rng,
                );
                state.push_agent(role, Some(name));
            }
            state.active_template_id = Some(template.id.to_string());
        });

        info!(template_id = %template_id, agents = template.roles.len(), "Standard team created");
        true
    }

    pub fn active_template_id(&self) -> Option<String> {
        self.inner.read(|state| state.active_template_id.clone())
    }

    // =========================================================================
    // Conversation history
    // =========================================================================

    pub fn add_to_conversation_history(&self, agent_id: u64, message: Message) -> bool {
        self.inner.mutate(|state| {
            state
                .agents
                .get_mut(agent_id)?
                .conversation_history
                .push(message);
            Some(())
        })
        .is_some()
    }

    pub fn conversation_history(&self, agent_id: u64) -> Vec<Message> {
        self.inner.read(|state| {
            state
                .agents
                .get(agent_id)
                .map(|a| a.conversation_history.clone())
                .unwrap_or_default()
        })
    }

    pub fn clear_conversation_history(&self, agent_id: u64) -> bool {
        self.inner.mutate(|state| {
            state.agents.get_mut(agent_id)?.conversation_history.clear();
            Some(())
        })
        .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Sender;
    use crate::storage::{MemoryStorage, StorageError, StorageResult};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;

    fn store() -> (AgentStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (AgentStore::load(Arc::new(storage.clone())), storage)
    }

    fn counting(store: &AgentStore) -> (Arc<AtomicUsize>, Subscription) {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let sub = store.subscribe(move |_: &[Agent]| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        (calls, sub)
    }

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Unavailable("disk on fire".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("disk on fire".into()))
        }
    }

    #[test]
    fn test_same_role_twice_gets_distinct_ids_and_default_names() {
        let (store, _) = store();

        let a = store.add_agent("Data Analyst", None);
        let b = store.add_agent("Data Analyst", None);

        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "Data Analyst");
        assert_eq!(b.name, "Data Analyst");
        assert_eq!(a.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_list_tracks_adds_and_removes_in_order() {
        let (store, _) = store();
        let ids: Vec<u64> = ["Architect", "Data Engineer", "Martech User", "Architect"]
            .iter()
            .map(|r| store.add_agent(r, None).id)
            .collect();

        assert!(store.remove_agent(ids[1]));
        assert!(store.remove_agent(ids[3]));
        let fresh = store.add_agent("Project Manager", Some("  Maya  ")).id;

        let listed: Vec<u64> = store.agents().iter().map(|a| a.id).collect();
        assert_eq!(listed, vec![ids[0], ids[2], fresh]);
        assert_eq!(listed.iter().collect::<HashSet<_>>().len(), listed.len());
        assert!(!ids.contains(&fresh));
        assert_eq!(store.agent(fresh).unwrap().name, "Maya");
    }

    #[test]
    fn test_remove_missing_returns_false_without_notifying() {
        let (store, _) = store();
        store.add_agent("Architect", None);
        let (calls, _sub) = counting(&store);

        assert!(!store.remove_agent(999));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_temperature_update_bounds() {
        let (store, _) = store();
        let id = store.add_agent("Architect", None).id;

        assert!(store.update_agent_temperature(id, 0.0));
        assert!(store.update_agent_temperature(id, 1.0));
        assert!(!store.update_agent_temperature(id, 1.01));
        assert!(!store.update_agent_temperature(id, -0.1));
        assert!(!store.update_agent_temperature(id, f32::NAN));
        assert_eq!(store.agent(id).unwrap().temperature, 1.0);
    }

    #[test]
    fn test_update_is_all_or_nothing() {
        let (store, _) = store();
        let id = store.add_agent("Architect", None).id;

        let rejected = AgentUpdate {
            name: Some("Renamed".into()),
            temperature: Some(3.0),
        };
        assert!(!store.update_agent(id, rejected));
        assert_eq!(store.agent(id).unwrap().name, "Architect");

        assert!(!store.update_agent_name(id, "   "));
        assert!(!store.update_agent(id, AgentUpdate::default()));
        assert!(!store.update_agent_name(42, "Ghost"));

        assert!(store.update_agent(
            id,
            AgentUpdate {
                name: Some(" Renamed ".into()),
                temperature: Some(0.2),
            }
        ));
        let agent = store.agent(id).unwrap();
        assert_eq!(agent.name, "Renamed");
        assert_eq!(agent.temperature, 0.2);
    }

    #[test]
    fn test_subscribers_get_snapshot_and_can_read_store() {
        let storage = MemoryStorage::new();
        let store = Arc::new(AgentStore::load(Arc::new(storage)));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let reader = Arc::clone(&store);
        let sink = Arc::clone(&seen);
        let mut sub = store.subscribe(move |snapshot: &[Agent]| {
            // Reading back inside the callback must not deadlock
            assert_eq!(reader.agents().len(), snapshot.len());
            sink.lock().unwrap().push(snapshot.len());
        });

        store.add_agent("Architect", None);
        store.add_agent("Data Analyst", None);
        sub.unsubscribe();
        store.add_agent("Martech User", None);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_listener_mutation_does_not_leave_stale_views() {
        let store = Arc::new(AgentStore::load(Arc::new(MemoryStorage::new())));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let writer = Arc::clone(&store);
        let first = Arc::clone(&seen);
        let _a = store.subscribe(move |snapshot: &[Agent]| {
            first.lock().unwrap().push(("first", snapshot.len()));
            if snapshot.len() == 1 {
                writer.add_agent("Data Engineer", None);
            }
        });
        let second = Arc::clone(&seen);
        let _b = store.subscribe(move |snapshot: &[Agent]| {
            second.lock().unwrap().push(("second", snapshot.len()));
        });

        store.add_agent("Architect", None);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
        assert_eq!(store.agents().len(), 2);
    }

    #[test]
    fn test_concurrent_mutations_notify_in_order() {
        let store = Arc::new(AgentStore::load(Arc::new(MemoryStorage::new())));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |snapshot: &[Agent]| {
            sink.lock().unwrap().push(snapshot.len());
        });

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..25 {
                        store.add_agent("Data Analyst", None);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(*seen.lock().unwrap(), (1..=200).collect::<Vec<usize>>());
    }

    #[test]
    fn test_round_trip_through_storage() {
        let (store, storage) = store();
        let a = store.add_agent("Architect", Some("Nina Sharma"));
        let b = store.add_agent("Data Engineer", None);
        store.remove_agent(a.id);
        store.update_approver_name("Jordan");
        store.add_to_conversation_history(b.id, Message::user("Plan the pipeline"));

        let reloaded = AgentStore::load(Arc::new(storage.clone()));

        assert_eq!(reloaded.agents(), store.agents());
        assert_eq!(reloaded.approver().name, "Jordan");
        assert_eq!(reloaded.add_agent("Architect", None).id, b.id + 1);

        let raw: serde_json::Value =
            serde_json::from_str(&storage.get(AGENT_STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["nextId"], 3);
        assert_eq!(raw["approver"]["id"], "human-approver");
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let storage = MemoryStorage::new().with_entry(AGENT_STORAGE_KEY, "{not json");
        let store = AgentStore::load(Arc::new(storage));

        assert!(store.agents().is_empty());
        assert_eq!(store.approver(), Approver::default());
        assert_eq!(store.add_agent("Architect", None).id, 1);
    }

    #[test]
    fn test_stored_temperature_is_clamped_on_load() {
        let raw = r#"{"agents":[{"id":7,"name":"x","role":"Architect","temperature":4.5}],"nextId":2}"#;
        let store = AgentStore::load(Arc::new(MemoryStorage::new().with_entry(AGENT_STORAGE_KEY, raw)));

        assert_eq!(store.agent(7).unwrap().temperature, 1.0);
        // nextId below an existing id is raised so ids stay unique
        assert_eq!(store.add_agent("Architect", None).id, 8);
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let store = AgentStore::load(Arc::new(BrokenStorage));
        let (calls, _sub) = counting(&store);

        let agent = store.add_agent("Architect", None);

        assert_eq!(store.agents(), vec![agent]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_create_standard_team() {
        let (store, _) = store();
        store.add_agent("Architect", None);
        let (calls, _sub) = counting(&store);

        assert!(store.create_standard_team("analytics-dashboard"));

        let agents = store.agents();
        let roles: Vec<&str> = agents.iter().map(|a| a.role.as_str()).collect();
        assert_eq!(roles, vec!["Data Analyst", "Data Engineer", "Architect"]);
        let names: HashSet<&str> = agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|n| names::NAME_POOL.contains(n)));
        assert_eq!(store.active_template_id().as_deref(), Some("analytics-dashboard"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(!store.create_standard_team("nope"));
        assert_eq!(store.agents().len(), 3);

        store.clear_all_agents();
        assert!(store.agents().is_empty());
        assert_eq!(store.active_template_id(), None);
    }

    #[test]
    fn test_conversation_history() {
        let (store, _) = store();
        let id = store.add_agent("Architect", None).id;

        assert!(store.add_to_conversation_history(id, Message::user("hi")));
        assert!(store.add_to_conversation_history(id, Message::agent("hello")));
        assert!(!store.add_to_conversation_history(99, Message::user("lost")));

        let history = store.conversation_history(id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].sender, Sender::Agent);
        assert!(store.conversation_history(99).is_empty());

        assert!(store.clear_conversation_history(id));
        assert!(store.conversation_history(id).is_empty());
    }

    #[test]
    fn test_suggested_name_skips_current_names() {
        let (store, _) = store();
        for name in &names::NAME_POOL[1..] {
            store.add_agent("Architect", Some(name));
        }

        assert_eq!(store.suggested_name(), names::NAME_POOL[0]);
    }
}
