//! Page state: the history-keeping manager, the handle bound to a mounted
//! page, and the key-restricted view handed to extensions.

mod manager;
mod restricted;

pub use manager::{ChangeListener, PageStateManager};
pub use restricted::RestrictedStateManager;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::StateError;

/// Flat key/value page state.
pub type State = serde_json::Map<String, Value>;

/// Read/write access to the state of the mounted page.
pub trait PageState: Send + Sync {
    fn get_state(&self) -> State;

    /// Shallow-merge `patch` into the current state.
    fn set_state(&self, patch: State) -> Result<(), StateError>;
}

pub type StateHandle = Arc<dyn PageState>;

/// Build a one-entry patch.
pub fn patch(key: impl Into<String>, value: impl Into<Value>) -> State {
    let mut state = State::new();
    state.insert(key.into(), value.into());
    state
}

/// Ties state handles to one mounted page.
///
/// Once detached, writes through handles built on this attachment are
/// discarded.
#[derive(Debug, Clone)]
pub struct Attachment(Arc<AtomicBool>);

impl Attachment {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_attached(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn detach(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Attachment {
    fn default() -> Self {
        Self::new()
    }
}

/// The full-access state handle given to a page controller.
pub struct AttachedState {
    manager: PageStateManager,
    attachment: Attachment,
}

impl AttachedState {
    pub fn new(manager: PageStateManager, attachment: Attachment) -> Self {
        Self {
            manager,
            attachment,
        }
    }
}

impl PageState for AttachedState {
    fn get_state(&self) -> State {
        self.manager.get_state()
    }

    fn set_state(&self, patch: State) -> Result<(), StateError> {
        if !self.attachment.is_attached() {
            debug!(
                keys = ?patch.keys().collect::<Vec<_>>(),
                "discarding state write from a destroyed page"
            );
            return Ok(());
        }
        self.manager.set_state(patch);
        Ok(())
    }
}
