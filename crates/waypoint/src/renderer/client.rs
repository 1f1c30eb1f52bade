use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

use super::{PageRenderer, RenderedPage, RootView, View, ViewRegistry};
use crate::controller::{DecoratedController, PageContext};
use crate::options::RouteOptions;
use crate::resources::{resolve_pending, PageResources};
use crate::state::State;

struct MountedView {
    view: Arc<dyn View>,
    root: Option<Arc<dyn RootView>>,
    context: PageContext,
}

/// Renders as soon as ready values land and again on every state change.
///
/// The latest markup is kept in memory and read with
/// [`ClientPageRenderer::content`].
#[derive(Default)]
pub struct ClientPageRenderer {
    views: ViewRegistry,
    mounted: Mutex<Option<MountedView>>,
    content: Mutex<Option<String>>,
    renders: AtomicUsize,
}

impl ClientPageRenderer {
    pub fn new(views: ViewRegistry) -> Self {
        Self {
            views,
            ..Self::default()
        }
    }

    /// Markup of the last render pass
    pub fn content(&self) -> Option<String> {
        self.content.lock().clone()
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    fn render(&self, state: &State) {
        let Some((view, root, context)) = self
            .mounted
            .lock()
            .as_ref()
            .map(|m| (Arc::clone(&m.view), m.root.clone(), m.context.clone()))
        else {
            return;
        };

        let mut body = view.render(state, &context);
        if let Some(root) = root {
            body = root.render(body, state);
        }
        *self.content.lock() = Some(body.into_string());
        let pass = self.renders.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(pass, "client render pass");
    }

    async fn apply(&self, controller: &DecoratedController, resources: PageResources) -> anyhow::Result<RenderedPage> {
        let (ready, pending) = resources.split();
        controller.set_state(ready.clone())?;

        let mut loaded = ready;
        loaded.extend(resolve_pending(pending, controller.context().state().as_ref()).await?);
        controller.set_meta_params(&loaded);

        Ok(RenderedPage {
            status: controller.http_status(),
            content: self.content(),
            page_state: controller.get_state(),
        })
    }
}

#[async_trait]
impl PageRenderer for ClientPageRenderer {
    async fn mount(
        &self,
        controller: &DecoratedController,
        view: &Arc<dyn View>,
        resources: PageResources,
        options: &RouteOptions,
    ) -> anyhow::Result<RenderedPage> {
        *self.mounted.lock() = Some(MountedView {
            view: Arc::clone(view),
            root: self.views.root(options.managed_root_view.as_ref()),
            context: controller.context().clone(),
        });
        self.apply(controller, resources).await
    }

    async fn update(
        &self,
        controller: &DecoratedController,
        resources: PageResources,
    ) -> anyhow::Result<RenderedPage> {
        if let Some(mounted) = self.mounted.lock().as_mut() {
            mounted.context = controller.context().clone();
        }
        self.apply(controller, resources).await
    }

    fn unmount(&self) {
        *self.mounted.lock() = None;
        *self.content.lock() = None;
    }

    fn set_state(&self, state: &State) {
        self.render(state);
    }
}
