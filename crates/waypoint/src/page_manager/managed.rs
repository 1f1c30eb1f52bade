use std::sync::Arc;

use waypoint_router::RouteParams;

use crate::controller::DecoratedController;
use crate::handler::PageSummary;
use crate::options::RouteOptions;
use crate::page_ref::PageRef;
use crate::renderer::View;
use crate::state::Attachment;

/// Where the managed page is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagePhase {
    #[default]
    Empty,
    Constructed,
    Initialized,
    Loading,
    Mounted,
    Activated,
    Updating,
    Deactivated,
    Destroyed,
}

impl PagePhase {
    /// Whether the lifecycle may move from `self` to `next`
    pub fn can_transition_to(self, next: PagePhase) -> bool {
        use PagePhase::*;

        matches!(
            (self, next),
            (Empty, Constructed)
                | (Constructed, Initialized)
                | (Initialized, Loading)
                | (Loading, Mounted)
                | (Mounted, Activated)
                | (Mounted, Updating)
                | (Activated, Updating)
                | (Activated, Deactivated)
                | (Updating, Activated)
                | (Updating, Mounted)
                | (Updating, Deactivated)
                | (Constructed | Initialized | Loading | Mounted | Updating | Deactivated, Destroyed)
                | (Destroyed, Empty)
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivationState {
    pub activated: bool,
}

/// The page currently under management.
#[derive(Default)]
pub struct ManagedPage {
    pub(super) controller_ref: Option<PageRef>,
    pub(super) view_ref: Option<PageRef>,
    pub(super) options: Option<RouteOptions>,
    pub(super) params: RouteParams,
    pub(super) controller: Option<DecoratedController>,
    pub(super) view: Option<Arc<dyn View>>,
    pub(super) attachment: Option<Attachment>,
    pub(super) phase: PagePhase,
    pub(super) state: ActivationState,
}

impl ManagedPage {
    pub fn controller_ref(&self) -> Option<&PageRef> {
        self.controller_ref.as_ref()
    }

    pub fn view_ref(&self) -> Option<&PageRef> {
        self.view_ref.as_ref()
    }

    pub fn options(&self) -> Option<&RouteOptions> {
        self.options.as_ref()
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn controller(&self) -> Option<&DecoratedController> {
        self.controller.as_ref()
    }

    pub fn phase(&self) -> PagePhase {
        self.phase
    }

    pub fn is_activated(&self) -> bool {
        self.state.activated
    }

    pub fn is_empty(&self) -> bool {
        self.controller.is_none()
    }

    pub(super) fn summary(&self) -> Option<PageSummary> {
        Some(PageSummary {
            controller: self.controller_ref.clone()?,
            view: self.view_ref.clone()?,
            options: self.options.clone().unwrap_or_default(),
            params: self.params.clone(),
        })
    }
}

impl std::fmt::Debug for ManagedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedPage")
            .field("controller", &self.controller_ref)
            .field("view", &self.view_ref)
            .field("params", &self.params)
            .field("phase", &self.phase)
            .field("state", &self.state)
            .finish()
    }
}
