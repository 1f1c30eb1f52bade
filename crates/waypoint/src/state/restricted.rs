use std::collections::BTreeSet;
use std::fmt;

use tracing::{error, warn};

use super::{PageState, State, StateHandle};
use crate::config::ValidationMode;
use crate::error::StateError;

/// State access limited to a set of keys.
///
/// Reads see the whole page state. Writes touching a key outside the allowed
/// set are rejected in strict mode and trimmed in lenient mode.
pub struct RestrictedStateManager {
    inner: StateHandle,
    allowed: BTreeSet<String>,
    mode: ValidationMode,
}

impl RestrictedStateManager {
    pub fn new(inner: StateHandle, allowed: BTreeSet<String>, mode: ValidationMode) -> Self {
        Self {
            inner,
            allowed,
            mode,
        }
    }

    pub fn allowed_keys(&self) -> &BTreeSet<String> {
        &self.allowed
    }

    fn unauthorized(&self, patch: &State) -> Vec<String> {
        patch
            .keys()
            .filter(|key| !self.allowed.contains(*key))
            .cloned()
            .collect()
    }
}

impl PageState for RestrictedStateManager {
    fn get_state(&self) -> State {
        self.inner.get_state()
    }

    fn set_state(&self, mut patch: State) -> Result<(), StateError> {
        let keys = self.unauthorized(&patch);
        if keys.is_empty() {
            return self.inner.set_state(patch);
        }

        match self.mode {
            ValidationMode::Strict => {
                error!(?keys, allowed = ?self.allowed, "rejected state write with unauthorized keys");
                Err(StateError::UnauthorizedKeys {
                    keys,
                    allowed: self.allowed.iter().cloned().collect(),
                })
            }
            ValidationMode::Lenient => {
                warn!(?keys, allowed = ?self.allowed, "dropping unauthorized keys from state write");
                patch.retain(|key, _| self.allowed.contains(key));
                if patch.is_empty() {
                    return Ok(());
                }
                self.inner.set_state(patch)
            }
        }
    }
}

impl fmt::Debug for RestrictedStateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestrictedStateManager")
            .field("allowed", &self.allowed)
            .field("mode", &self.mode)
            .finish()
    }
}
