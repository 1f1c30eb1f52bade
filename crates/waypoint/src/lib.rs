// Waypoint - navigation and page lifecycle for isomorphic web applications
// Routes resolve to controller + view pairs; the page manager mounts,
// updates and tears them down, and renders through a server or client renderer.

pub mod config;
pub mod controller;
pub mod dictionary;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod handler;
pub mod meta;
pub mod navigation;
pub mod options;
pub mod page_manager;
pub mod page_ref;
pub mod platform;
pub mod renderer;
pub mod resources;
pub mod response;
pub mod router;
pub mod services;
pub mod state;

// Re-export the route compiler
pub use waypoint_router::{self as routes, Route, RouteParams, RouteTable};

// Re-export Maud for views
pub use maud::{html, Markup, PreEscaped, DOCTYPE};

pub use config::{Config, PageConfig, RouterConfig, ValidationMode};
pub use controller::{Controller, DecoratedController, Extension, PageContext};
pub use dictionary::Dictionary;
pub use dispatcher::{Dispatcher, EventDispatcher, RouteEventData, RouterEvent};
pub use error::{
    LifecycleError, NavigationError, PageFactoryError, RouterError, SharedError, StateError,
};
pub use factory::{PageFactory, RegistryPageFactory};
pub use handler::{PageHandler, PageSummary, ScrollHistoryHandler};
pub use meta::MetaManager;
pub use navigation::NavigationAction;
pub use options::{OnlyUpdate, RouteOptions, RouteOverrides};
pub use page_manager::{PageManager, PagePhase, PageRequest};
pub use page_ref::PageRef;
pub use platform::{HistoryPlatform, Platform, PlatformKind, ServerPlatform};
pub use renderer::{
    ClientPageRenderer, DocumentView, PageRenderer, RenderedPage, RootView, ServerPageRenderer,
    View, ViewRegistry,
};
pub use resources::{PageResources, Resource};
pub use response::RouteResponse;
pub use router::{Links, PageRoute, PageTarget, Router, ERROR_ROUTE, NOT_FOUND_ROUTE};
pub use services::PageServices;
pub use state::{patch, PageState, PageStateManager, State, StateHandle};
