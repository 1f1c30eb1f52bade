//! Hooks run around every page transition.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;
use waypoint_router::RouteParams;

use crate::navigation::NavigationAction;
use crate::options::RouteOptions;
use crate::page_ref::PageRef;
use crate::platform::Platform;

/// The page a transition is coming from or going to
#[derive(Debug, Clone)]
pub struct PageSummary {
    pub controller: PageRef,
    pub view: PageRef,
    pub options: RouteOptions,
    pub params: RouteParams,
}

pub trait PageHandler: Send + Sync {
    /// Before the page manager touches the mounted page
    fn pre_manage(&self, _managed: Option<&PageSummary>, _next: &PageSummary, _action: &NavigationAction) {}

    /// After the next page is mounted or updated
    fn post_manage(&self, _managed: &PageSummary, _previous: Option<&PageSummary>, _action: &NavigationAction) {}

    fn destroy(&self) {}
}

/// Remembers the scroll position of each URL and restores it when the user
/// goes back or forward.
///
/// The address bar may already show the next URL when `pre_manage` runs, so
/// the handler tracks the path of the page it last saw managed.
pub struct ScrollHistoryHandler {
    platform: Arc<dyn Platform>,
    positions: Mutex<HashMap<String, (f64, f64)>>,
    managed_path: Mutex<Option<String>>,
}

impl ScrollHistoryHandler {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            positions: Mutex::new(HashMap::new()),
            managed_path: Mutex::new(None),
        }
    }

    pub fn saved_position(&self, path: &str) -> Option<(f64, f64)> {
        self.positions.lock().get(path).copied()
    }
}

impl PageHandler for ScrollHistoryHandler {
    fn pre_manage(&self, managed: Option<&PageSummary>, _next: &PageSummary, _action: &NavigationAction) {
        if managed.is_none() {
            return;
        }
        let Some(path) = self.managed_path.lock().clone() else {
            return;
        };
        let position = self.platform.scroll_position();
        trace!(path = %path, ?position, "saving scroll position");
        self.positions.lock().insert(path, position);
    }

    fn post_manage(&self, _managed: &PageSummary, _previous: Option<&PageSummary>, action: &NavigationAction) {
        let path = self.platform.current_path();
        if action.is_pop_state() {
            if let Some((x, y)) = self.saved_position(&path) {
                self.platform.scroll_to(x, y);
            }
        }
        *self.managed_path.lock() = Some(path);
    }

    fn destroy(&self) {
        self.positions.lock().clear();
        *self.managed_path.lock() = None;
    }
}
