use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{PageState, State};
use crate::error::StateError;

/// Called with the full state after every applied change.
pub type ChangeListener = Arc<dyn Fn(&State) + Send + Sync>;

struct StateHistory {
    states: Vec<State>,
    cursor: Option<usize>,
    limit: usize,
    transaction: Option<Vec<State>>,
    on_change: Option<ChangeListener>,
}

impl StateHistory {
    fn current(&self) -> Option<&State> {
        self.cursor.and_then(|cursor| self.states.get(cursor))
    }

    fn push(&mut self, patch: State) -> State {
        let mut next = self.current().cloned().unwrap_or_default();
        next.extend(patch);

        if let Some(cursor) = self.cursor {
            self.states.truncate(cursor + 1);
        }
        self.states.push(next.clone());
        if self.states.len() > self.limit {
            let excess = self.states.len() - self.limit;
            self.states.drain(..excess);
            debug!(evicted = excess, limit = self.limit, "evicted oldest page states");
        }
        self.cursor = Some(self.states.len() - 1);
        next
    }
}

/// Keeps the state history of the mounted page.
///
/// Cloning yields another handle to the same history. The change listener is
/// always invoked after the internal lock is released, so it may read the
/// state again.
#[derive(Clone)]
pub struct PageStateManager {
    inner: Arc<Mutex<StateHistory>>,
}

impl PageStateManager {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StateHistory {
                states: Vec::new(),
                cursor: None,
                limit: limit.max(1),
                transaction: None,
                on_change: None,
            })),
        }
    }

    pub fn history_limit(&self) -> usize {
        self.inner.lock().limit
    }

    pub fn get_state(&self) -> State {
        self.inner.lock().current().cloned().unwrap_or_default()
    }

    /// Every snapshot still kept, oldest first
    pub fn get_all_states(&self) -> Vec<State> {
        self.inner.lock().states.clone()
    }

    /// Merge `patch` into a new snapshot, or queue it while a transaction is open.
    pub fn set_state(&self, patch: State) {
        let notify = {
            let mut history = self.inner.lock();
            match history.transaction.as_mut() {
                Some(queue) => {
                    queue.push(patch);
                    None
                }
                None => {
                    let state = history.push(patch);
                    history.on_change.clone().map(|listener| (listener, state))
                }
            }
        };

        if let Some((listener, state)) = notify {
            listener(&state);
        }
    }

    pub fn clear(&self) {
        let mut history = self.inner.lock();
        history.states.clear();
        history.cursor = None;
        history.transaction = None;
    }

    pub fn on_change(&self, listener: impl Fn(&State) + Send + Sync + 'static) {
        self.inner.lock().on_change = Some(Arc::new(listener));
    }

    pub fn clear_on_change(&self) {
        self.inner.lock().on_change = None;
    }

    pub fn has_listener(&self) -> bool {
        self.inner.lock().on_change.is_some()
    }

    /// Start queueing patches instead of applying them
    pub fn begin_transaction(&self) {
        let mut history = self.inner.lock();
        if history.transaction.is_some() {
            warn!("state transaction already open, discarding its queued patches");
        }
        history.transaction = Some(Vec::new());
    }

    /// Apply every queued patch as one snapshot and notify once.
    pub fn commit_transaction(&self) -> Result<(), StateError> {
        let patches = self
            .inner
            .lock()
            .transaction
            .take()
            .ok_or(StateError::TransactionNotStarted)?;

        if patches.is_empty() {
            return Ok(());
        }

        let merged = patches.into_iter().fold(State::new(), |mut merged, patch| {
            merged.extend(patch);
            merged
        });
        self.set_state(merged);
        Ok(())
    }

    pub fn cancel_transaction(&self) {
        self.inner.lock().transaction = None;
    }
}

impl Default for PageStateManager {
    fn default() -> Self {
        Self::new(10)
    }
}

impl fmt::Debug for PageStateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let history = self.inner.lock();
        f.debug_struct("PageStateManager")
            .field("states", &history.states.len())
            .field("cursor", &history.cursor)
            .field("limit", &history.limit)
            .field("in_transaction", &history.transaction.is_some())
            .finish()
    }
}

impl PageState for PageStateManager {
    fn get_state(&self) -> State {
        PageStateManager::get_state(self)
    }

    fn set_state(&self, patch: State) -> Result<(), StateError> {
        PageStateManager::set_state(self, patch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::patch;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_set_state_merges_shallowly() {
        let manager = PageStateManager::new(10);
        manager.set_state(patch("a", 1));
        manager.set_state(patch("b", json!({"nested": true})));
        manager.set_state(patch("a", 2));

        let state = manager.get_state();
        assert_eq!(state.get("a"), Some(&json!(2)));
        assert_eq!(state.get("b"), Some(&json!({"nested": true})));
    }

    #[test]
    fn test_history_is_capped() {
        let manager = PageStateManager::new(3);
        for i in 0..5 {
            manager.set_state(patch("n", i));
        }

        let states = manager.get_all_states();
        assert_eq!(states.len(), 3);
        assert_eq!(states[0].get("n"), Some(&json!(2)));
        assert_eq!(manager.get_state().get("n"), Some(&json!(4)));
    }

    #[test]
    fn test_listener_sees_full_state_and_may_read_again() {
        let manager = PageStateManager::new(10);
        let reader = manager.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        manager.on_change(move |state| {
            assert_eq!(&reader.get_state(), state);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        manager.set_state(patch("a", 1));
        manager.set_state(patch("b", 2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        manager.clear_on_change();
        manager.set_state(patch("c", 3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_transaction_applies_once() {
        let manager = PageStateManager::new(10);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        manager.on_change(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        manager.begin_transaction();
        manager.set_state(patch("a", 1));
        manager.set_state(patch("b", 2));
        assert!(manager.get_state().is_empty());

        manager.commit_transaction().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.get_all_states().len(), 1);
        assert_eq!(manager.get_state().len(), 2);
    }

    #[test]
    fn test_commit_without_transaction_fails() {
        let manager = PageStateManager::new(10);
        assert_eq!(
            manager.commit_transaction(),
            Err(StateError::TransactionNotStarted)
        );
    }

    #[test]
    fn test_cancel_drops_queue() {
        let manager = PageStateManager::new(10);
        manager.begin_transaction();
        manager.set_state(patch("a", 1));
        manager.cancel_transaction();
        manager.set_state(patch("b", 2));

        let state = manager.get_state();
        assert!(state.get("a").is_none());
        assert_eq!(state.get("b"), Some(&json!(2)));
    }

    #[test]
    fn test_clear_empties_history() {
        let manager = PageStateManager::new(10);
        manager.set_state(patch("a", 1));
        manager.clear();
        assert!(manager.get_state().is_empty());
        assert!(manager.get_all_states().is_empty());
    }
}
