//! The application state store.
//!
//! Owns the current [`AppState`], applies actions through [`reduce`],
//! persists every resulting state and then notifies subscribers.

use super::{Action, AppState, StateStorage, reduce};
use crate::constants::STATE_STORAGE_KEY;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&AppState)>;

/// Single source of truth for groups, pieces and edit state.
pub struct Store<S: StateStorage> {
    state: AppState,
    storage: S,
    key: String,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl<S: StateStorage> Store<S> {
    /// Open the store under the default storage key.
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, STATE_STORAGE_KEY)
    }

    /// Load the state stored under `key`.
    ///
    /// Missing, unreadable or malformed data yields an empty state. The
    /// loaded state is written back immediately.
    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = match storage.load(&key) {
            Ok(Some(json)) => match AppState::from_json(&json) {
                Ok(state) => {
                    log::info!(
                        "Loaded state: {} groups, {} pieces",
                        state.groups.len(),
                        state.pieces.len()
                    );
                    state
                }
                Err(e) => {
                    log::warn!("Discarding malformed persisted state: {}", e);
                    AppState::default()
                }
            },
            Ok(None) => {
                log::debug!("No persisted state under '{}'", key);
                AppState::default()
            }
            Err(e) => {
                log::warn!("Failed to read persisted state: {}", e);
                AppState::default()
            }
        };

        let mut store = Self {
            state,
            storage,
            key,
            subscribers: Vec::new(),
            next_subscription: 0,
        };
        store.persist();
        store
    }

    /// The current state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply an action: reduce, persist, then notify subscribers.
    pub fn dispatch(&mut self, action: Action) {
        self.dispatch_all([action]);
    }

    /// Apply several actions as one change.
    ///
    /// Only the final state is persisted and seen by subscribers.
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        let mut changed = false;
        for action in actions {
            self.state = reduce(&self.state, action);
            changed = true;
        }
        if !changed {
            return;
        }
        self.persist();
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
    }

    /// Register a callback invoked with every new state.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&AppState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns false if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Write the current state; failures are logged and otherwise ignored.
    fn persist(&mut self) {
        let json = match self.state.to_json() {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize state: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.save(&self.key, &json) {
            log::warn!("Failed to persist state: {}", e);
        }
    }
}

impl<S: StateStorage + std::fmt::Debug> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("storage", &self.storage)
            .field("key", &self.key)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
