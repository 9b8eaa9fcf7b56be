//! Team member store - the humans on the team.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collection::EntityCollection;
use crate::entity::{display_name, valid_name, TeamMember};
use crate::observer::{StoreListener, Subscription};
use crate::persisted::{PersistedStore, StoreState};
use crate::roles::TeamMemberRole;
use crate::storage::KeyValueStorage;

pub const TEAM_MEMBER_STORAGE_KEY: &str = "team-builder-members";

/// Persisted layout: `{members, nextId}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedMembers {
    #[serde(default)]
    members: Vec<TeamMember>,
    #[serde(default = "first_id")]
    next_id: u64,
}

fn first_id() -> u64 {
    1
}

#[derive(Debug, Default)]
struct MemberState {
    members: EntityCollection<TeamMember>,
}

impl StoreState for MemberState {
    type Item = TeamMember;
    const LABEL: &'static str = "team-members";

    fn decode(raw: &str) -> serde_json::Result<Self> {
        let persisted: PersistedMembers = serde_json::from_str(raw)?;
        Ok(Self {
            members: EntityCollection::from_parts(persisted.members, persisted.next_id),
        })
    }

    fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(&PersistedMembers {
            members: self.members.snapshot(),
            next_id: self.members.next_id(),
        })
    }

    fn snapshot(&self) -> Vec<TeamMember> {
        self.members.snapshot()
    }
}

/// Observable, persisted collection of team members.
pub struct TeamMemberStore {
    inner: PersistedStore<MemberState>,
}

impl TeamMemberStore {
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::load_with_key(storage, TEAM_MEMBER_STORAGE_KEY)
    }

    pub fn load_with_key(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            inner: PersistedStore::load(storage, key.into()),
        }
    }

    /// Same delivery rules as [`crate::AgentStore::subscribe`].
    pub fn subscribe(&self, listener: impl StoreListener<TeamMember> + 'static) -> Subscription {
        self.inner.subscribe(listener)
    }

    /// Add a member; the name defaults to the role.
    pub fn add_member(&self, role: &str, name: Option<&str>) -> TeamMember {
        let member = self.inner.apply(|state| {
            let member = TeamMember {
                id: state.members.allocate_id(),
                name: display_name(role, name),
                role: role.to_string(),
                created_at: Utc::now(),
            };
            state.members.push(member.clone());
            member
        });
        info!(member_id = member.id, role = %member.role, "Team member added");
        member
    }

    pub fn remove_member(&self, id: u64) -> bool {
        self.inner.mutate(|state| state.members.remove(id)).is_some()
    }

    pub fn update_member_name(&self, id: u64, name: &str) -> bool {
        let Some(name) = valid_name(name) else {
            return false;
        };
        self.inner
            .mutate(|state| {
                state.members.get_mut(id)?.name = name;
                Some(())
            })
            .is_some()
    }

    pub fn members(&self) -> Vec<TeamMember> {
        self.inner.read(|state| state.members.snapshot())
    }

    pub fn member(&self, id: u64) -> Option<TeamMember> {
        self.inner.read(|state| state.members.get(id).cloned())
    }

    pub fn roles(&self) -> Vec<&'static str> {
        TeamMemberRole::ALL.iter().map(TeamMemberRole::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_add_remove_rename() {
        let store = TeamMemberStore::load(Arc::new(MemoryStorage::new()));

        let dev = store.add_member("Developer", Some("Kevin Zhang"));
        let designer = store.add_member("Designer", None);
        assert_eq!(designer.name, "Designer");
        assert!(dev.id < designer.id);

        assert!(store.update_member_name(designer.id, "Olivia"));
        assert!(!store.update_member_name(designer.id, ""));
        assert!(store.remove_member(dev.id));
        assert!(!store.remove_member(dev.id));

        let members = store.members();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Olivia");
    }

    #[test]
    fn test_notifications_only_on_change() {
        let store = TeamMemberStore::load(Arc::new(MemoryStorage::new()));
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let mut sub = store.subscribe(move |_: &[TeamMember]| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let m = store.add_member("Analyst", None);
        store.remove_member(m.id + 100);
        store.remove_member(m.id);
        sub.unsubscribe();
        store.add_member("Manager", None);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let storage = MemoryStorage::new().with_entry(TEAM_MEMBER_STORAGE_KEY, "[1,2");
        let store = TeamMemberStore::load(Arc::new(storage));

        assert!(store.members().is_empty());
        assert_eq!(store.add_member("Developer", None).id, 1);
    }

    #[test]
    fn test_round_trip() {
        let storage = MemoryStorage::new();
        let store = TeamMemberStore::load(Arc::new(storage.clone()));
        store.add_member("Developer", None);
        let removed = store.add_member("Manager", None);
        store.remove_member(removed.id);

        let reloaded = TeamMemberStore::load(Arc::new(storage));
        assert_eq!(reloaded.members(), store.members());
        assert_eq!(reloaded.add_member("Analyst", None).id, 3);
    }
}
