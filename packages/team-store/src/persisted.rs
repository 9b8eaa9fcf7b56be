//! Lock, persist and notify plumbing shared by the stores.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::observer::{lock, Listeners, StoreListener, Subscription};
use crate::storage::KeyValueStorage;

/// State kept by a [`PersistedStore`] under a single storage key.
pub(crate) trait StoreState: Default + Send + 'static {
    type Item: Send + 'static;

    /// Store name for log lines.
    const LABEL: &'static str;

    fn decode(raw: &str) -> serde_json::Result<Self>;

    fn encode(&self) -> serde_json::Result<String>;

    /// What listeners receive after a change.
    fn snapshot(&self) -> Vec<Self::Item>;
}

pub(crate) struct PersistedStore<S: StoreState> {
    state: Mutex<S>,
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    listeners: Listeners<S::Item>,
}

impl<S: StoreState> PersistedStore<S> {
    /// A missing, unreadable or corrupt slot yields the default state.
    pub fn load(storage: Arc<dyn KeyValueStorage>, key: String) -> Self {
        let state = match storage.get(&key) {
            Ok(Some(raw)) => S::decode(&raw).unwrap_or_else(|e| {
                warn!(store = S::LABEL, key = %key, error = %e, "Stored state is corrupt, starting empty");
                S::default()
            }),
            Ok(None) => {
                debug!(store = S::LABEL, key = %key, "Nothing stored yet");
                S::default()
            }
            Err(e) => {
                warn!(store = S::LABEL, key = %key, error = %e, "Failed to load store, starting empty");
                S::default()
            }
        };

        Self {
            state: Mutex::new(state),
            storage,
            key,
            listeners: Listeners::new(),
        }
    }

    pub fn subscribe(&self, listener: impl StoreListener<S::Item> + 'static) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&lock(&self.state))
    }

    /// Run `f` under the state lock, persist, then notify outside the lock.
    pub fn apply<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = {
            let mut state = lock(&self.state);
            let result = f(&mut state);
            self.commit(&state);
            result
        };

        self.listeners.flush();
        result
    }

    /// Like [`PersistedStore::apply`], but a `None` from `f` means nothing
    /// changed: no write, no notification.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut S) -> Option<R>) -> Option<R> {
        let result = {
            let mut state = lock(&self.state);
            let result = f(&mut state)?;
            self.commit(&state);
            result
        };

        self.listeners.flush();
        Some(result)
    }

    /// Caller holds the state lock.
    fn commit(&self, state: &S) {
        match state.encode() {
            Ok(json) => {
                if let Err(e) = self.storage.set(&self.key, &json) {
                    warn!(store = S::LABEL, key = %self.key, error = %e, "Failed to save store");
                }
            }
            Err(e) => warn!(store = S::LABEL, error = %e, "Failed to serialize store"),
        }

        self.listeners.enqueue(state.snapshot());
    }
}
