//! Subscriber registry shared by the stores.
//!
//! Listeners receive the full snapshot after every successful mutation.
//! Stores queue snapshots with [`Listeners::enqueue`] while holding their
//! state lock and deliver them with [`Listeners::flush`] after releasing it,
//! so a listener may read or mutate the store it is subscribed to and
//! snapshots always arrive in mutation order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Receives store snapshots.
pub trait StoreListener<T>: Send + Sync {
    fn on_change(&self, snapshot: &[T]);
}

impl<T, F> StoreListener<T> for F
where
    F: Fn(&[T]) + Send + Sync,
{
    fn on_change(&self, snapshot: &[T]) {
        self(snapshot)
    }
}

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Arc<dyn StoreListener<T>>)>,
}

struct Outbox<T> {
    pending: VecDeque<Vec<T>>,
    delivering: bool,
}

/// Ordered list of listeners.
pub struct Listeners<T> {
    registry: Arc<Mutex<Registry<T>>>,
    outbox: Mutex<Outbox<T>>,
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
            outbox: Mutex::new(Outbox {
                pending: VecDeque::new(),
                delivering: false,
            }),
        }
    }

    /// Register a listener. It stays attached until the returned
    /// [`Subscription`] is unsubscribed.
    pub fn subscribe(&self, listener: impl StoreListener<T> + 'static) -> Subscription {
        let listener: Arc<dyn StoreListener<T>> = Arc::new(listener);
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, listener));
            id
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    lock(&registry).entries.retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    /// Call every listener, in subscription order, with the snapshot.
    pub fn notify(&self, snapshot: &[T]) {
        // Copy the list out so listeners can (un)subscribe while being called
        let listeners: Vec<Arc<dyn StoreListener<T>>> = lock(&self.registry)
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            listener.on_change(snapshot);
        }
    }

    /// Queue a snapshot for [`Listeners::flush`].
    ///
    /// Call this while holding the lock that produced the snapshot, so the
    /// queue follows mutation order.
    pub fn enqueue(&self, snapshot: Vec<T>) {
        lock(&self.outbox).pending.push_back(snapshot);
    }

    /// Deliver queued snapshots, oldest first.
    ///
    /// One caller delivers at a time. A flush that finds a delivery already
    /// running (on another thread, or from inside a listener) returns at once
    /// and leaves its snapshot to the running delivery, so it may return
    /// before listeners have seen it.
    pub fn flush(&self) {
        loop {
            let snapshot = {
                let mut outbox = lock(&self.outbox);
                if outbox.delivering {
                    return;
                }
                let Some(snapshot) = outbox.pending.pop_front() else {
                    return;
                };
                outbox.delivering = true;
                snapshot
            };

            let _delivering = Delivering(&self.outbox);
            self.notify(&snapshot);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the delivering flag even if a listener panics.
struct Delivering<'a, T>(&'a Mutex<Outbox<T>>);

impl<T> Drop for Delivering<'_, T> {
    fn drop(&mut self) {
        lock(self.0).delivering = false;
    }
}

/// Handle returned by `subscribe`.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Detach the listener. Calling this again does nothing.
    pub fn unsubscribe(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }

    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
