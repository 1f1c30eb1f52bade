use crate::error::SharedError;
use crate::renderer::RenderedPage;
use crate::state::State;

/// Outcome of handling one navigation
#[derive(Debug, Clone, Default)]
pub struct RouteResponse {
    pub status: u16,
    pub content: Option<String>,
    pub page_state: State,
    /// The failure an error or not-found page was rendered for
    pub error: Option<SharedError>,
    /// Target URL when the navigation ended in a redirect
    pub redirect: Option<String>,
}

impl RouteResponse {
    pub fn redirect(url: impl Into<String>, status: u16) -> Self {
        Self {
            status,
            redirect: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect.is_some()
    }
}

impl From<RenderedPage> for RouteResponse {
    fn from(page: RenderedPage) -> Self {
        Self {
            status: page.status,
            content: page.content,
            page_state: page.page_state,
            error: None,
            redirect: None,
        }
    }
}
