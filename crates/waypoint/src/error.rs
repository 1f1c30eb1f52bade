//! Error types shared by the router, the page manager and page state.

use std::sync::Arc;

use thiserror::Error;
use waypoint_router::RouteError;

use crate::page_manager::PagePhase;

/// An error that travels with a response and into error-page params.
pub type SharedError = Arc<anyhow::Error>;

/// A failure that carries an HTTP-style status.
///
/// Controllers return these from `load`/`update` to steer the router:
/// 4xx recovers to the not-found page, 3xx follows `url`, anything else
/// lands on the error page.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct NavigationError {
    message: String,
    status: u16,
    url: Option<String>,
    path: Option<String>,
}

impl NavigationError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
            url: None,
            path: None,
        }
    }

    /// The 404 raised when no route matches `path`
    pub fn not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            message: format!("route for path `{}` is not configured", path),
            status: 404,
            url: None,
            path: Some(path),
        }
    }

    /// Ask the router to redirect to `url` with a 3xx `status`
    pub fn redirect(url: impl Into<String>, status: u16) -> Self {
        let url = url.into();
        Self {
            message: format!("redirect to {}", url),
            status,
            url: Some(url),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// Status attached to `error`, if it is (or wraps) a [`NavigationError`].
pub fn status_of(error: &anyhow::Error) -> Option<u16> {
    error.downcast_ref::<NavigationError>().map(NavigationError::status)
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("no route named `{0}`")]
    UnknownRoute(String),

    #[error("the `{0}` route is not configured")]
    UnconfiguredErrorRoute(&'static str),

    #[error("no route matches path `{0}`")]
    NoRouteForPath(String),

    #[error("redirect loop detected while following `{url}` ({limit} redirects)")]
    RedirectLoop { url: String, limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("state keys {keys:?} are not allowed here (allowed: {allowed:?})")]
    UnauthorizedKeys {
        keys: Vec<String>,
        allowed: Vec<String>,
    },

    #[error("no state transaction in progress")]
    TransactionNotStarted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageFactoryError {
    #[error("no {kind} registered as `{reference}`")]
    Unresolved {
        kind: &'static str,
        reference: String,
    },

    #[error("`{reference}` does not construct a {kind}")]
    NotAConstructor {
        kind: &'static str,
        reference: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("page cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: PagePhase, to: PagePhase },

    #[error("no page is currently managed")]
    NoManagedPage,
}
