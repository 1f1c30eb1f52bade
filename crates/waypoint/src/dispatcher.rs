//! Router event notifications.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;
use waypoint_router::RouteParams;

use crate::navigation::NavigationAction;
use crate::options::RouteOptions;
use crate::response::RouteResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterEvent {
    /// Fired before the page manager takes over a navigation
    BeforeHandleRoute,
    /// Fired once the navigation produced a response
    AfterHandleRoute,
}

#[derive(Debug, Clone)]
pub struct RouteEventData {
    pub route: String,
    pub params: RouteParams,
    pub path: String,
    pub options: RouteOptions,
    pub action: NavigationAction,
    pub response: Option<RouteResponse>,
}

pub trait Dispatcher: Send + Sync {
    /// `internal` marks events raised by the framework itself.
    fn fire(&self, event: RouterEvent, data: &RouteEventData, internal: bool);
}

pub type Listener = Arc<dyn Fn(&RouteEventData) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Dispatcher with per-event listener lists
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<HashMap<RouterEvent, Vec<(ListenerId, Listener)>>>,
    next_id: AtomicU64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen(&self, event: RouterEvent, listener: impl Fn(&RouteEventData) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .entry(event)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns whether a listener was removed
    pub fn unlisten(&self, event: RouterEvent, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(list) = listeners.get_mut(&event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(listener_id, _)| *listener_id != id);
        before != list.len()
    }

    pub fn clear(&self) {
        self.listeners.write().clear();
    }
}

impl Dispatcher for EventDispatcher {
    fn fire(&self, event: RouterEvent, data: &RouteEventData, internal: bool) {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .get(&event)
            .map(|list| list.iter().map(|(_, listener)| Arc::clone(listener)).collect())
            .unwrap_or_default();

        trace!(?event, route = %data.route, internal, listeners = listeners.len(), "firing router event");
        for listener in listeners {
            listener(data);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        f.debug_struct("EventDispatcher")
            .field("listeners", &listeners.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
