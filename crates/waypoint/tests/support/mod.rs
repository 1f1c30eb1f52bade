// Shared controllers, extensions and views for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use waypoint::{
    html, ClientPageRenderer, Controller, Extension, HistoryPlatform, Markup, PageConfig, PageContext,
    PageManager, PageRef, PageResources, PageServices, Platform, RegistryPageFactory, RouteParams,
    State, StateHandle, View,
};

/// Ordered record of lifecycle calls
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    /// Everything recorded since the last `take`
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }
}

pub type LoadFn = Arc<dyn Fn(&PageContext) -> anyhow::Result<PageResources> + Send + Sync>;

#[derive(Clone)]
pub struct ScriptedController {
    name: &'static str,
    journal: Journal,
    extensions: Vec<PageRef>,
    load: LoadFn,
    update: LoadFn,
    status: u16,
    fail_init: bool,
    captured: Arc<Mutex<Option<StateHandle>>>,
}

impl ScriptedController {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            extensions: Vec::new(),
            load: Arc::new(move |_: &PageContext| Ok(PageResources::new().with("page", name))),
            update: Arc::new(|_: &PageContext| Ok(PageResources::new())),
            status: 200,
            fail_init: false,
            captured: Arc::new(Mutex::new(None)),
        }
    }

    pub fn loading(
        mut self,
        load: impl Fn(&PageContext) -> anyhow::Result<PageResources> + Send + Sync + 'static,
    ) -> Self {
        self.load = Arc::new(load);
        self
    }

    pub fn updating(
        mut self,
        update: impl Fn(&PageContext) -> anyhow::Result<PageResources> + Send + Sync + 'static,
    ) -> Self {
        self.update = Arc::new(update);
        self
    }

    pub fn with_extension(mut self, extension: impl Into<PageRef>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// The state handle the last constructed instance received
    pub fn captured_state(&self) -> Option<StateHandle> {
        self.captured.lock().clone()
    }
}

impl Controller for ScriptedController {
    fn extensions(&self) -> Vec<PageRef> {
        self.extensions.clone()
    }

    fn init(&mut self, page: &PageContext) -> anyhow::Result<()> {
        self.journal.record(format!("{}:init", self.name));
        *self.captured.lock() = Some(page.state().clone());
        if self.fail_init {
            anyhow::bail!("{} failed to initialize", self.name);
        }
        Ok(())
    }

    fn load(&mut self, page: &PageContext) -> anyhow::Result<PageResources> {
        self.journal.record(format!("{}:load", self.name));
        (self.load)(page)
    }

    fn update(&mut self, page: &PageContext, _previous: &RouteParams) -> anyhow::Result<PageResources> {
        self.journal.record(format!("{}:update", self.name));
        (self.update)(page)
    }

    fn activate(&mut self, _page: &PageContext) {
        self.journal.record(format!("{}:activate", self.name));
    }

    fn deactivate(&mut self, _page: &PageContext) {
        self.journal.record(format!("{}:deactivate", self.name));
    }

    fn destroy(&mut self, _page: &PageContext) {
        self.journal.record(format!("{}:destroy", self.name));
    }

    fn set_meta_params(&self, _loaded: &State, page: &PageContext) {
        page.meta().set_title(self.name);
    }

    fn http_status(&self) -> u16 {
        self.status
    }
}

#[derive(Clone)]
pub struct ScriptedExtension {
    name: &'static str,
    journal: Journal,
    allowed: Vec<String>,
    load: LoadFn,
    captured: Arc<Mutex<Option<StateHandle>>>,
}

impl ScriptedExtension {
    pub fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            allowed: Vec::new(),
            load: Arc::new(|_: &PageContext| Ok(PageResources::new())),
            captured: Arc::new(Mutex::new(None)),
        }
    }

    pub fn allowing(mut self, keys: &[&str]) -> Self {
        self.allowed = keys.iter().map(|key| key.to_string()).collect();
        self
    }

    pub fn loading(
        mut self,
        load: impl Fn(&PageContext) -> anyhow::Result<PageResources> + Send + Sync + 'static,
    ) -> Self {
        self.load = Arc::new(load);
        self
    }

    /// The restricted handle the extension held when it was activated
    pub fn captured_state(&self) -> Option<StateHandle> {
        self.captured.lock().clone()
    }
}

impl Extension for ScriptedExtension {
    fn allowed_state_keys(&self) -> Vec<String> {
        self.allowed.clone()
    }

    fn init(&mut self, _page: &PageContext) -> anyhow::Result<()> {
        self.journal.record(format!("{}:init", self.name));
        Ok(())
    }

    fn load(&mut self, page: &PageContext) -> anyhow::Result<PageResources> {
        self.journal.record(format!("{}:load", self.name));
        (self.load)(page)
    }

    fn update(&mut self, _page: &PageContext, _previous: &RouteParams) -> anyhow::Result<PageResources> {
        self.journal.record(format!("{}:update", self.name));
        Ok(PageResources::new())
    }

    fn activate(&mut self, page: &PageContext) {
        self.journal.record(format!("{}:activate", self.name));
        *self.captured.lock() = Some(page.state().clone());
    }

    fn deactivate(&mut self, _page: &PageContext) {
        self.journal.record(format!("{}:deactivate", self.name));
    }

    fn destroy(&mut self, _page: &PageContext) {
        self.journal.record(format!("{}:destroy", self.name));
    }
}

/// Renders every state entry as `<p>key=value</p>`
pub struct StateView;

impl View for StateView {
    fn render(&self, state: &State, _page: &PageContext) -> Markup {
        html! {
            @for (key, value) in state {
                p { (key) "=" (text(value)) }
            }
        }
    }
}

pub fn text(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}

pub fn client_manager(
    factory: RegistryPageFactory,
    config: &PageConfig,
) -> (PageManager, Arc<ClientPageRenderer>, Arc<HistoryPlatform>) {
    let renderer = Arc::new(ClientPageRenderer::default());
    let platform = Arc::new(HistoryPlatform::new("http://localhost", "http://localhost/"));
    let manager = PageManager::new(
        Arc::new(factory),
        renderer.clone(),
        platform.clone() as Arc<dyn Platform>,
        PageServices::default(),
        config,
    );
    (manager, renderer, platform)
}
