//! Per-route navigation options and per-navigation overrides.

use std::fmt;
use std::sync::Arc;

use crate::page_ref::PageRef;

/// Predicate deciding reuse from the currently mounted controller and view.
pub type OnlyUpdatePredicate = Arc<dyn Fn(Option<&PageRef>, Option<&PageRef>) -> bool + Send + Sync>;

/// Whether a navigation may update the mounted page in place.
#[derive(Clone)]
pub enum OnlyUpdate {
    /// Reuse when `true` and the next route names the same controller and view
    Flag(bool),
    /// Reuse whenever the predicate says so
    When(OnlyUpdatePredicate),
}

impl OnlyUpdate {
    pub fn when(predicate: impl Fn(Option<&PageRef>, Option<&PageRef>) -> bool + Send + Sync + 'static) -> Self {
        OnlyUpdate::When(Arc::new(predicate))
    }
}

impl Default for OnlyUpdate {
    fn default() -> Self {
        OnlyUpdate::Flag(false)
    }
}

impl fmt::Debug for OnlyUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnlyUpdate::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
            OnlyUpdate::When(_) => f.write_str("When(<predicate>)"),
        }
    }
}

impl From<bool> for OnlyUpdate {
    fn from(flag: bool) -> Self {
        OnlyUpdate::Flag(flag)
    }
}

#[derive(Debug, Clone)]
pub struct RouteOptions {
    pub only_update: OnlyUpdate,
    /// Scroll to the top before managing the next page
    pub auto_scroll: bool,
    /// Allow client-side navigation; `false` forces a full page load
    pub allow_spa: bool,
    pub document_view: Option<PageRef>,
    pub managed_root_view: Option<PageRef>,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            only_update: OnlyUpdate::default(),
            auto_scroll: true,
            allow_spa: true,
            document_view: None,
            managed_root_view: None,
        }
    }
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_only_update(mut self, only_update: impl Into<OnlyUpdate>) -> Self {
        self.only_update = only_update.into();
        self
    }

    pub fn with_auto_scroll(mut self, auto_scroll: bool) -> Self {
        self.auto_scroll = auto_scroll;
        self
    }

    pub fn with_allow_spa(mut self, allow_spa: bool) -> Self {
        self.allow_spa = allow_spa;
        self
    }

    pub fn with_document_view(mut self, view: impl Into<PageRef>) -> Self {
        self.document_view = Some(view.into());
        self
    }

    pub fn with_managed_root_view(mut self, view: impl Into<PageRef>) -> Self {
        self.managed_root_view = Some(view.into());
        self
    }

    /// These options with every field set in `overrides` replaced
    pub fn merged(&self, overrides: &RouteOverrides) -> RouteOptions {
        RouteOptions {
            only_update: overrides
                .only_update
                .clone()
                .unwrap_or_else(|| self.only_update.clone()),
            auto_scroll: overrides.auto_scroll.unwrap_or(self.auto_scroll),
            allow_spa: overrides.allow_spa.unwrap_or(self.allow_spa),
            document_view: overrides
                .document_view
                .clone()
                .or_else(|| self.document_view.clone()),
            managed_root_view: overrides
                .managed_root_view
                .clone()
                .or_else(|| self.managed_root_view.clone()),
        }
    }
}

/// Options supplied for a single navigation.
#[derive(Debug, Clone, Default)]
pub struct RouteOverrides {
    pub only_update: Option<OnlyUpdate>,
    pub auto_scroll: Option<bool>,
    pub allow_spa: Option<bool>,
    pub document_view: Option<PageRef>,
    pub managed_root_view: Option<PageRef>,
    /// Status used when this navigation ends in a redirect
    pub http_status: Option<u16>,
    /// Replace the current history entry instead of pushing one
    pub replace_state: bool,
}

impl RouteOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_only_update(mut self, only_update: impl Into<OnlyUpdate>) -> Self {
        self.only_update = Some(only_update.into());
        self
    }

    pub fn with_auto_scroll(mut self, auto_scroll: bool) -> Self {
        self.auto_scroll = Some(auto_scroll);
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_replace_state(mut self, replace_state: bool) -> Self {
        self.replace_state = replace_state;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RouteOptions::default();
        assert!(matches!(options.only_update, OnlyUpdate::Flag(false)));
        assert!(options.auto_scroll);
        assert!(options.allow_spa);
        assert!(options.document_view.is_none());
    }

    #[test]
    fn test_overrides_replace_only_set_fields() {
        let options = RouteOptions::new()
            .with_only_update(true)
            .with_document_view("shell");
        let merged = options.merged(&RouteOverrides::new().with_auto_scroll(false));

        assert!(matches!(merged.only_update, OnlyUpdate::Flag(true)));
        assert!(!merged.auto_scroll);
        assert!(merged.allow_spa);
        assert_eq!(merged.document_view, Some(PageRef::name("shell")));
    }
}
