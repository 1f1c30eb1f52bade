//! The page lifecycle manager.
//!
//! `manage` either updates the mounted page in place or tears it down and
//! mounts the next one:
//!
//! ```text
//! Empty -> Constructed -> Initialized -> Loading -> Mounted -> Activated
//!                                                     ^          |
//!                                                     +- Updating <-+
//! Activated -> Deactivated -> Destroyed -> Empty
//! ```
//!
//! A failed in-place update settles back into `Activated` (or `Mounted` when
//! the page never activated) with its previous params, so the page can still
//! be updated or torn down afterwards.

mod managed;

pub use managed::{ActivationState, ManagedPage, PagePhase};

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, error, trace, warn};
use waypoint_router::RouteParams;

use crate::config::{PageConfig, ValidationMode};
use crate::controller::{DecoratedController, PageContext};
use crate::error::{LifecycleError, SharedError};
use crate::factory::PageFactory;
use crate::handler::{PageHandler, PageSummary};
use crate::navigation::NavigationAction;
use crate::options::{OnlyUpdate, RouteOptions};
use crate::page_ref::PageRef;
use crate::platform::Platform;
use crate::renderer::{PageRenderer, RenderedPage};
use crate::resources::PageResources;
use crate::response::RouteResponse;
use crate::services::PageServices;
use crate::state::{AttachedState, Attachment, PageStateManager, StateHandle};

/// One navigation handed to the page manager
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub controller: PageRef,
    pub view: PageRef,
    pub options: RouteOptions,
    pub params: RouteParams,
    pub error: Option<SharedError>,
    pub action: NavigationAction,
}

impl PageRequest {
    pub fn new(controller: impl Into<PageRef>, view: impl Into<PageRef>) -> Self {
        Self {
            controller: controller.into(),
            view: view.into(),
            options: RouteOptions::default(),
            params: RouteParams::new(),
            error: None,
            action: NavigationAction::Initial,
        }
    }

    pub fn with_options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_error(mut self, error: SharedError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_action(mut self, action: NavigationAction) -> Self {
        self.action = action;
        self
    }

    fn summary(&self) -> PageSummary {
        PageSummary {
            controller: self.controller.clone(),
            view: self.view.clone(),
            options: self.options.clone(),
            params: self.params.clone(),
        }
    }
}

pub struct PageManager {
    factory: Arc<dyn PageFactory>,
    renderer: Arc<dyn PageRenderer>,
    platform: Arc<dyn Platform>,
    state: PageStateManager,
    services: PageServices,
    handlers: Vec<Arc<dyn PageHandler>>,
    mode: ValidationMode,
    managed: ManagedPage,
}

impl PageManager {
    pub fn new(
        factory: Arc<dyn PageFactory>,
        renderer: Arc<dyn PageRenderer>,
        platform: Arc<dyn Platform>,
        services: PageServices,
        config: &PageConfig,
    ) -> Self {
        let manager = Self {
            factory,
            renderer,
            platform,
            state: PageStateManager::new(config.history_limit),
            services,
            handlers: Vec::new(),
            mode: config.validation,
            managed: ManagedPage::default(),
        };
        manager.init();
        manager
    }

    /// Forward page state changes to the renderer
    pub fn init(&self) {
        let renderer = Arc::clone(&self.renderer);
        self.state.on_change(move |state| renderer.set_state(state));
    }

    pub fn with_handler(mut self, handler: Arc<dyn PageHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn add_handler(&mut self, handler: Arc<dyn PageHandler>) {
        self.handlers.push(handler);
    }

    pub fn services(&self) -> &PageServices {
        &self.services
    }

    pub fn page_state(&self) -> &PageStateManager {
        &self.state
    }

    pub fn managed_page(&self) -> &ManagedPage {
        &self.managed
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn scroll_to(&self, x: f64, y: f64) {
        self.platform.scroll_to(x, y);
    }

    /// Mount, or update in place, the page described by `request`.
    pub async fn manage(&mut self, request: PageRequest) -> anyhow::Result<RouteResponse> {
        if !self.state.has_listener() {
            self.init();
        }

        let previous = self.managed.summary();
        let next = request.summary();
        let action = request.action.clone();

        for handler in &self.handlers {
            handler.pre_manage(previous.as_ref(), &next, &action);
        }
        if request.options.auto_scroll {
            self.scroll_to(0.0, 0.0);
        }

        let response = if self.has_only_update(&request.controller, &request.view, &request.options) {
            self.update_page(request).await?
        } else {
            self.mount_page(request).await?
        };

        if let Some(managed) = self.managed.summary() {
            for handler in &self.handlers {
                handler.post_manage(&managed, previous.as_ref(), &action);
            }
        }

        Ok(response)
    }

    /// Tear down the managed page and stop listening for state changes.
    pub fn destroy(&mut self) {
        for handler in &self.handlers {
            handler.destroy();
        }
        self.destroy_managed_page();
        self.state.clear_on_change();
    }

    fn has_only_update(&self, controller: &PageRef, view: &PageRef, options: &RouteOptions) -> bool {
        if self.managed.is_empty() {
            return false;
        }

        match &options.only_update {
            OnlyUpdate::When(predicate) => predicate(self.managed.controller_ref(), self.managed.view_ref()),
            OnlyUpdate::Flag(flag) => {
                *flag
                    && self.managed.controller_ref().is_some_and(|managed| managed.same_as(controller))
                    && self.managed.view_ref().is_some_and(|managed| managed.same_as(view))
            }
        }
    }

    async fn mount_page(&mut self, request: PageRequest) -> anyhow::Result<RouteResponse> {
        self.destroy_managed_page();

        let PageRequest {
            controller: controller_ref,
            view: view_ref,
            options,
            params,
            error,
            ..
        } = request;
        debug!(controller = controller_ref.label(), view = view_ref.label(), "mounting page");

        let controller = self.factory.create_controller(&controller_ref)?;
        let extensions = controller
            .extensions()
            .iter()
            .map(|reference| self.factory.create_extension(reference))
            .collect::<Result<Vec<_>, _>>()?;
        let view = self.factory.create_view(&view_ref)?;

        let attachment = Attachment::new();
        let state: StateHandle = Arc::new(AttachedState::new(self.state.clone(), attachment.clone()));
        let context = PageContext::new(params.clone(), error, state, self.services.clone());
        let decorated = self
            .factory
            .decorate_controller(controller, extensions, context, self.mode);

        self.managed = ManagedPage {
            controller_ref: Some(controller_ref),
            view_ref: Some(view_ref),
            options: Some(options.clone()),
            params,
            controller: Some(decorated),
            view: Some(view),
            attachment: Some(attachment),
            ..ManagedPage::default()
        };
        self.advance(PagePhase::Constructed)?;

        let resources = match self.init_page().and_then(|()| self.load_page()) {
            Ok(resources) => resources,
            Err(err) => {
                warn!(error = %err, "page failed before mounting, tearing it down");
                self.destroy_managed_page();
                return Err(err);
            }
        };

        let renderer = Arc::clone(&self.renderer);
        let (Some(controller), Some(view)) = (self.managed.controller.as_ref(), self.managed.view.as_ref()) else {
            return Err(LifecycleError::NoManagedPage.into());
        };
        let rendered = renderer.mount(controller, view, resources, &options).await;

        self.advance(PagePhase::Mounted)?;
        let rendered = rendered?;
        self.activate_page()?;

        Ok(rendered.into())
    }

    async fn update_page(&mut self, request: PageRequest) -> anyhow::Result<RouteResponse> {
        let PageRequest {
            options,
            params,
            error,
            ..
        } = request;
        debug!(params = ?params, "updating page in place");

        let previous = std::mem::replace(&mut self.managed.params, params.clone());
        self.managed.options = Some(options);
        self.advance(PagePhase::Updating)?;

        let rendered = match self.apply_update(params, error, &previous).await {
            Ok(rendered) => rendered,
            Err(err) => {
                let settled = if self.managed.state.activated {
                    PagePhase::Activated
                } else {
                    PagePhase::Mounted
                };
                warn!(error = %err, phase = ?settled, "in-place update failed");
                self.managed.params = previous;
                self.advance(settled)?;
                return Err(err);
            }
        };

        if self.managed.state.activated {
            self.advance(PagePhase::Activated)?;
        } else {
            self.advance(PagePhase::Mounted)?;
            self.activate_page()?;
        }

        Ok(rendered.into())
    }

    async fn apply_update(
        &mut self,
        params: RouteParams,
        error: Option<SharedError>,
        previous: &RouteParams,
    ) -> anyhow::Result<RenderedPage> {
        let factory = Arc::clone(&self.factory);
        let mode = self.mode;
        let rescope = move |state: &StateHandle, allowed: BTreeSet<String>| {
            factory.decorate_page_state_manager(state, allowed, mode)
        };
        let resources = {
            let controller = self.controller_mut()?;
            controller.set_route(params, error);
            controller.update(previous, &rescope)?
        };

        let renderer = Arc::clone(&self.renderer);
        let controller = self
            .managed
            .controller
            .as_ref()
            .ok_or(LifecycleError::NoManagedPage)?;
        renderer.update(controller, resources).await
    }

    fn init_page(&mut self) -> anyhow::Result<()> {
        self.controller_mut()?.init()?;
        self.advance(PagePhase::Initialized)?;
        Ok(())
    }

    fn load_page(&mut self) -> anyhow::Result<PageResources> {
        self.advance(PagePhase::Loading)?;

        let factory = Arc::clone(&self.factory);
        let mode = self.mode;
        let rescope = move |state: &StateHandle, allowed: BTreeSet<String>| {
            factory.decorate_page_state_manager(state, allowed, mode)
        };
        self.controller_mut()?.load(&rescope)
    }

    fn activate_page(&mut self) -> Result<(), LifecycleError> {
        if self.managed.state.activated {
            return Ok(());
        }
        self.controller_mut()?.activate();
        self.managed.state.activated = true;
        self.advance(PagePhase::Activated)
    }

    fn destroy_managed_page(&mut self) {
        if self.managed.is_empty() {
            return;
        }

        if self.managed.state.activated {
            if let Some(controller) = self.managed.controller.as_mut() {
                controller.deactivate();
            }
            self.managed.state.activated = false;
            let _ = self.advance(PagePhase::Deactivated);
        }

        if let Some(controller) = self.managed.controller.as_mut() {
            controller.destroy();
        }
        let _ = self.advance(PagePhase::Destroyed);

        if let Some(attachment) = self.managed.attachment.take() {
            attachment.detach();
        }
        self.state.clear();
        self.renderer.unmount();

        debug!(
            controller = self.managed.controller_ref().map(PageRef::label),
            "destroyed page"
        );
        self.managed = ManagedPage::default();
    }

    fn controller_mut(&mut self) -> Result<&mut DecoratedController, LifecycleError> {
        self.managed
            .controller
            .as_mut()
            .ok_or(LifecycleError::NoManagedPage)
    }

    fn advance(&mut self, next: PagePhase) -> Result<(), LifecycleError> {
        let current = self.managed.phase;
        if !current.can_transition_to(next) {
            match self.mode {
                ValidationMode::Strict => {
                    error!(?current, ?next, "illegal page lifecycle transition");
                    return Err(LifecycleError::InvalidTransition {
                        from: current,
                        to: next,
                    });
                }
                ValidationMode::Lenient => {
                    warn!(?current, ?next, "illegal page lifecycle transition");
                }
            }
        }
        trace!(?current, ?next, "page lifecycle");
        self.managed.phase = next;
        Ok(())
    }
}
