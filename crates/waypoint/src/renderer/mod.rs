//! Page rendering: the renderer seam plus the server and client renderers.
//!
//! Views are maud templates over the page state. A route may name a document
//! view (the full HTML shell, server only) and a managed root view (a layout
//! wrapped around every page view).

mod client;
mod document;
mod server;

pub use client::ClientPageRenderer;
pub use document::{DefaultDocument, ViewRegistry};
pub use server::ServerPageRenderer;

use std::sync::Arc;

use async_trait::async_trait;
use maud::Markup;

use crate::controller::{DecoratedController, PageContext};
use crate::meta::MetaManager;
use crate::options::RouteOptions;
use crate::resources::PageResources;
use crate::state::State;

/// Renders the page body from the current state
pub trait View: Send + Sync {
    fn render(&self, state: &State, page: &PageContext) -> Markup;
}

/// Layout wrapped around the page view
pub trait RootView: Send + Sync {
    fn render(&self, page: Markup, state: &State) -> Markup;
}

/// The HTML document shell produced on the server
pub trait DocumentView: Send + Sync {
    fn render(&self, page: Markup, meta: &MetaManager, state: &State) -> Markup;
}

/// What a mount or update produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedPage {
    pub status: u16,
    pub content: Option<String>,
    pub page_state: State,
}

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render a freshly constructed page from its loaded resources.
    async fn mount(
        &self,
        controller: &DecoratedController,
        view: &Arc<dyn View>,
        resources: PageResources,
        options: &RouteOptions,
    ) -> anyhow::Result<RenderedPage>;

    /// Re-render the mounted page after an in-place update.
    async fn update(
        &self,
        controller: &DecoratedController,
        resources: PageResources,
    ) -> anyhow::Result<RenderedPage>;

    fn unmount(&self);

    /// Page state changed
    fn set_state(&self, state: &State);
}
