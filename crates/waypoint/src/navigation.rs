/// What started a navigation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavigationAction {
    /// First render of the application (or the server request)
    #[default]
    Initial,
    Redirect { url: String },
    Click { url: String },
    /// History traversal (back/forward)
    PopState { url: String },
    /// Rendering the error or not-found page
    Error,
}

impl NavigationAction {
    pub fn url(&self) -> Option<&str> {
        match self {
            NavigationAction::Redirect { url }
            | NavigationAction::Click { url }
            | NavigationAction::PopState { url } => Some(url),
            NavigationAction::Initial | NavigationAction::Error => None,
        }
    }

    pub fn is_pop_state(&self) -> bool {
        matches!(self, NavigationAction::PopState { .. })
    }
}
