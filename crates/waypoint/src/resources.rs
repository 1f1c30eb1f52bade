//! What a controller's `load`/`update` returns: a keyed mix of values that
//! are ready now and values still being produced.

use std::fmt;
use std::future::Future;

use futures::future::{join_all, BoxFuture, FutureExt};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::state::{patch, PageState, State};

/// A value that will be written to page state once it resolves.
pub type PendingValue = BoxFuture<'static, anyhow::Result<Value>>;

pub enum Resource {
    Ready(Value),
    Pending(PendingValue),
}

impl Resource {
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Resource::Pending(future.boxed())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Resource::Pending(_))
    }
}

impl From<Value> for Resource {
    fn from(value: Value) -> Self {
        Resource::Ready(value)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Resource::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

#[derive(Debug, Default)]
pub struct PageResources {
    entries: IndexMap<String, Resource>,
}

impl PageResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ready value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .insert(key.into(), Resource::Ready(value.into()));
        self
    }

    /// Add a value produced by `future`
    pub fn with_pending<F>(mut self, key: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.entries.insert(key.into(), Resource::pending(future));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, resource: Resource) {
        self.entries.insert(key.into(), resource);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Resource> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold `other` in; its entries win on key collisions.
    pub fn merge(&mut self, other: PageResources) {
        for (key, resource) in other.entries {
            self.entries.insert(key, resource);
        }
    }

    /// Separate ready values from pending ones
    pub fn split(self) -> (State, Vec<(String, PendingValue)>) {
        let mut ready = State::new();
        let mut pending = Vec::new();
        for (key, resource) in self.entries {
            match resource {
                Resource::Ready(value) => {
                    ready.insert(key, value);
                }
                Resource::Pending(future) => pending.push((key, future)),
            }
        }
        (ready, pending)
    }
}

impl FromIterator<(String, Value)> for PageResources {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key, Resource::Ready(value)))
                .collect(),
        }
    }
}

/// Await every pending value, writing each to `state` as it resolves.
///
/// Values that resolve are applied even when a sibling fails; the first
/// failure (in declaration order) is returned once all have settled.
pub async fn resolve_pending(
    pending: Vec<(String, PendingValue)>,
    state: &dyn PageState,
) -> anyhow::Result<State> {
    let settled = join_all(pending.into_iter().map(|(key, future)| async move {
        let result = future.await;
        if let Ok(value) = &result {
            debug!(key = %key, "pending page value resolved");
            if let Err(err) = state.set_state(patch(key.clone(), value.clone())) {
                warn!(key = %key, error = %err, "resolved page value was not applied");
            }
        }
        (key, result)
    }))
    .await;

    let mut loaded = State::new();
    let mut failure = None;
    for (key, result) in settled {
        match result {
            Ok(value) => {
                loaded.insert(key, value);
            }
            Err(err) => {
                warn!(key = %key, error = %err, "pending page value failed");
                failure.get_or_insert(err);
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(loaded),
    }
}

/// Apply ready values in one write, then settle the pending ones.
///
/// Returns every loaded value, or the first pending failure.
pub async fn settle(resources: PageResources, state: &dyn PageState) -> anyhow::Result<State> {
    let (ready, pending) = resources.split();
    state.set_state(ready.clone())?;

    let mut loaded = ready;
    loaded.extend(resolve_pending(pending, state).await?);
    Ok(loaded)
}
