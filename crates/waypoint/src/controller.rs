//! Page controllers, the extensions mixed into them, and the context every
//! lifecycle hook receives.

use std::collections::BTreeSet;
use std::fmt;

use parking_lot::MutexGuard;
use serde_json::Value;
use waypoint_router::RouteParams;

use crate::dictionary::Dictionary;
use crate::error::{SharedError, StateError};
use crate::meta::MetaManager;
use crate::page_ref::PageRef;
use crate::resources::PageResources;
use crate::router::Links;
use crate::services::PageServices;
use crate::state::{State, StateHandle};

/// Everything a controller or extension can see about the current page.
#[derive(Clone)]
pub struct PageContext {
    params: RouteParams,
    error: Option<SharedError>,
    state: StateHandle,
    services: PageServices,
}

impl PageContext {
    pub fn new(
        params: RouteParams,
        error: Option<SharedError>,
        state: StateHandle,
        services: PageServices,
    ) -> Self {
        Self {
            params,
            error,
            state,
            services,
        }
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name).filter(|value| !value.is_null())
    }

    /// The failure that led here, when rendering an error or not-found page
    pub fn error(&self) -> Option<&SharedError> {
        self.error.as_ref()
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    pub fn get_state(&self) -> State {
        self.state.get_state()
    }

    pub fn set_state(&self, patch: State) -> Result<(), StateError> {
        self.state.set_state(patch)
    }

    pub fn services(&self) -> &PageServices {
        &self.services
    }

    pub fn meta(&self) -> MutexGuard<'_, MetaManager> {
        self.services.meta()
    }

    pub fn links(&self) -> &Links {
        self.services.links()
    }

    pub fn dictionary(&self) -> &Dictionary {
        self.services.dictionary()
    }

    pub fn settings(&self) -> &Value {
        self.services.settings()
    }

    pub(crate) fn set_route(&mut self, params: RouteParams, error: Option<SharedError>) {
        self.params = params;
        self.error = error;
    }

    pub(crate) fn with_state(&self, state: StateHandle) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageContext")
            .field("params", &self.params)
            .field("error", &self.error.as_ref().map(|err| err.to_string()))
            .finish_non_exhaustive()
    }
}

/// The page-level unit of behavior.
///
/// A controller is constructed for every mount and dropped when its page is
/// destroyed. Only `load` is required.
pub trait Controller: Send + Sync {
    /// Extensions mixed into this page, constructed alongside it
    fn extensions(&self) -> Vec<PageRef> {
        Vec::new()
    }

    fn init(&mut self, _page: &PageContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn load(&mut self, page: &PageContext) -> anyhow::Result<PageResources>;

    /// Called instead of a remount when the route allows in-place updates
    fn update(&mut self, _page: &PageContext, _previous: &RouteParams) -> anyhow::Result<PageResources> {
        Ok(PageResources::new())
    }

    fn activate(&mut self, _page: &PageContext) {}

    fn deactivate(&mut self, _page: &PageContext) {}

    fn destroy(&mut self, _page: &PageContext) {}

    /// Fill document metadata from the loaded values
    fn set_meta_params(&self, _loaded: &State, _page: &PageContext) {}

    fn http_status(&self) -> u16 {
        200
    }
}

/// Reusable behavior mixed into a controller.
///
/// Extensions write page state through a restricted handle: only the keys
/// from [`Extension::allowed_state_keys`] and the keys of their own loaded
/// values are writable.
pub trait Extension: Send + Sync {
    fn allowed_state_keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn init(&mut self, _page: &PageContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn load(&mut self, _page: &PageContext) -> anyhow::Result<PageResources> {
        Ok(PageResources::new())
    }

    fn update(&mut self, _page: &PageContext, _previous: &RouteParams) -> anyhow::Result<PageResources> {
        Ok(PageResources::new())
    }

    fn activate(&mut self, _page: &PageContext) {}

    fn deactivate(&mut self, _page: &PageContext) {}

    fn destroy(&mut self, _page: &PageContext) {}
}

/// Builds a restricted state handle from the controller's handle and a key set.
pub type Rescope<'a> = &'a dyn Fn(&StateHandle, BTreeSet<String>) -> StateHandle;

pub struct ManagedExtension {
    extension: Box<dyn Extension>,
    context: PageContext,
}

impl ManagedExtension {
    pub fn new(extension: Box<dyn Extension>, context: PageContext) -> Self {
        Self { extension, context }
    }

    pub fn extension(&self) -> &dyn Extension {
        self.extension.as_ref()
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    fn rescope(&mut self, resources: &PageResources, controller_state: &StateHandle, rescope: Rescope<'_>) {
        let allowed: BTreeSet<String> = self
            .extension
            .allowed_state_keys()
            .into_iter()
            .chain(resources.keys().map(str::to_string))
            .collect();
        self.context.state = rescope(controller_state, allowed);
    }
}

/// A controller wired to its context and extensions.
pub struct DecoratedController {
    controller: Box<dyn Controller>,
    context: PageContext,
    extensions: Vec<ManagedExtension>,
}

impl DecoratedController {
    pub fn new(controller: Box<dyn Controller>, context: PageContext, extensions: Vec<ManagedExtension>) -> Self {
        Self {
            controller,
            context,
            extensions,
        }
    }

    pub fn controller(&self) -> &dyn Controller {
        self.controller.as_ref()
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn extensions(&self) -> &[ManagedExtension] {
        &self.extensions
    }

    pub fn get_state(&self) -> State {
        self.context.get_state()
    }

    pub fn set_state(&self, patch: State) -> Result<(), StateError> {
        self.context.set_state(patch)
    }

    pub fn http_status(&self) -> u16 {
        self.controller.http_status()
    }

    pub fn set_meta_params(&self, loaded: &State) {
        self.context.meta().clear();
        self.controller.set_meta_params(loaded, &self.context);
    }

    pub(crate) fn set_route(&mut self, params: RouteParams, error: Option<SharedError>) {
        for managed in &mut self.extensions {
            managed.context.set_route(params.clone(), error.clone());
        }
        self.context.set_route(params, error);
    }

    pub(crate) fn init(&mut self) -> anyhow::Result<()> {
        self.controller.init(&self.context)?;
        for managed in &mut self.extensions {
            managed.extension.init(&managed.context)?;
        }
        Ok(())
    }

    /// Load the controller and every extension; the controller's values win.
    pub(crate) fn load(&mut self, rescope: Rescope<'_>) -> anyhow::Result<PageResources> {
        let own = self.controller.load(&self.context)?;
        let mut merged = PageResources::new();
        for managed in &mut self.extensions {
            let resources = managed.extension.load(&managed.context)?;
            managed.rescope(&resources, &self.context.state, rescope);
            merged.merge(resources);
        }
        merged.merge(own);
        Ok(merged)
    }

    pub(crate) fn update(&mut self, previous: &RouteParams, rescope: Rescope<'_>) -> anyhow::Result<PageResources> {
        let own = self.controller.update(&self.context, previous)?;
        let mut merged = PageResources::new();
        for managed in &mut self.extensions {
            let resources = managed.extension.update(&managed.context, previous)?;
            managed.rescope(&resources, &self.context.state, rescope);
            merged.merge(resources);
        }
        merged.merge(own);
        Ok(merged)
    }

    pub(crate) fn activate(&mut self) {
        self.controller.activate(&self.context);
        for managed in &mut self.extensions {
            managed.extension.activate(&managed.context);
        }
    }

    pub(crate) fn deactivate(&mut self) {
        self.controller.deactivate(&self.context);
        for managed in &mut self.extensions {
            managed.extension.deactivate(&managed.context);
        }
    }

    pub(crate) fn destroy(&mut self) {
        for managed in &mut self.extensions {
            managed.extension.destroy(&managed.context);
        }
        self.controller.destroy(&self.context);
    }
}

impl fmt::Debug for DecoratedController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratedController")
            .field("context", &self.context)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}
