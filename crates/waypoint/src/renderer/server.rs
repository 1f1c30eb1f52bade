use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use tracing::debug;

use super::{PageRenderer, RenderedPage, View, ViewRegistry};
use crate::controller::DecoratedController;
use crate::options::RouteOptions;
use crate::resources::{settle, PageResources};
use crate::state::State;

/// Renders a complete document once every page value has settled.
#[derive(Debug, Clone, Default)]
pub struct ServerPageRenderer {
    views: ViewRegistry,
}

impl ServerPageRenderer {
    pub fn new(views: ViewRegistry) -> Self {
        Self { views }
    }
}

#[async_trait]
impl PageRenderer for ServerPageRenderer {
    async fn mount(
        &self,
        controller: &DecoratedController,
        view: &Arc<dyn View>,
        resources: PageResources,
        options: &RouteOptions,
    ) -> anyhow::Result<RenderedPage> {
        let page = controller.context();
        let loaded = settle(resources, page.state().as_ref()).await?;
        controller.set_meta_params(&loaded);

        let page_state = controller.get_state();
        let mut body = view.render(&page_state, page);
        if let Some(root) = self.views.root(options.managed_root_view.as_ref()) {
            body = root.render(body, &page_state);
        }

        let document = self.views.document(options.document_view.as_ref());
        let html = {
            let meta = page.meta();
            document.render(body, &meta, &page_state).into_string()
        };
        debug!(bytes = html.len(), "rendered page document");

        Ok(RenderedPage {
            status: controller.http_status(),
            content: Some(html),
            page_state,
        })
    }

    async fn update(
        &self,
        _controller: &DecoratedController,
        _resources: PageResources,
    ) -> anyhow::Result<RenderedPage> {
        bail!("pages cannot be updated in place while rendering on the server")
    }

    fn unmount(&self) {}

    fn set_state(&self, _state: &State) {}
}
