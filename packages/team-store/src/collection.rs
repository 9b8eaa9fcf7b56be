//! Ordered entity list with monotonic id allocation.

use std::collections::HashSet;

use tracing::warn;

use crate::entity::Entity;

/// Insertion-ordered entities plus the next id to hand out.
///
/// Ids only ever grow: removing or clearing entities never rewinds
/// `next_id`, so an id is never reused within a session.
#[derive(Debug, Clone)]
pub struct EntityCollection<T> {
    entities: Vec<T>,
    next_id: u64,
}

impl<T: Entity> EntityCollection<T> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild from persisted parts.
    ///
    /// Duplicate ids are dropped (first occurrence wins) and `next_id` is
    /// raised above every id present, whatever the stored counter says.
    pub fn from_parts(entities: Vec<T>, next_id: u64) -> Self {
        let mut seen = HashSet::new();
        let entities: Vec<T> = entities
            .into_iter()
            .filter(|e| {
                let fresh = seen.insert(e.id());
                if !fresh {
                    warn!(id = e.id(), "Dropping entity with duplicate id from storage");
                }
                fresh
            })
            .collect();

        let floor = entities.iter().map(Entity::id).max().map_or(1, |max| max + 1);

        Self {
            entities,
            next_id: next_id.max(floor),
        }
    }

    /// Reserve the next id.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn push(&mut self, entity: T) {
        self.entities.push(entity);
    }

    pub fn remove(&mut self, id: u64) -> Option<T> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        Some(self.entities.remove(index))
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entities
    }

    /// Owned copy in insertion order.
    pub fn snapshot(&self) -> Vec<T> {
        self.entities.clone()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<T: Entity> Default for EntityCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}
