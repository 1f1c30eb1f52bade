use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use waypoint_router::{RouteParams, RouteTable};

use super::{PageRoute, PageTarget};
use crate::config::RouterConfig;
use crate::error::RouterError;

/// The route table and router configuration, shared between the router and
/// every page that needs to build URLs.
#[derive(Clone, Default)]
pub struct Links {
    routes: Arc<RwLock<RouteTable<PageTarget>>>,
    config: Arc<RwLock<RouterConfig>>,
}

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&self, config: RouterConfig) {
        *self.config.write() = config;
    }

    pub fn config(&self) -> RouterConfig {
        self.config.read().clone()
    }

    /// `protocol//host`
    pub fn domain(&self) -> String {
        let config = self.config.read();
        format!("{}//{}", config.protocol, config.host)
    }

    /// Root plus language part: what application paths are prefixed with
    pub fn route_prefix(&self) -> String {
        let config = self.config.read();
        format!("{}{}", config.root, config.language_part_path)
    }

    pub fn base_url(&self) -> String {
        format!("{}{}", self.domain(), self.route_prefix())
    }

    /// Absolute URL of the named route filled with `params`
    pub fn link(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
        let path = self
            .routes
            .read()
            .get(name)
            .map(|route| route.to_path(params))
            .ok_or_else(|| RouterError::UnknownRoute(name.to_string()))?;
        Ok(format!("{}{}", self.base_url(), path))
    }

    pub fn get(&self, name: &str) -> Option<PageRoute> {
        self.routes.read().get(name).cloned()
    }

    /// First route, in insertion order, matching `path`
    pub fn resolve(&self, path: &str) -> Option<PageRoute> {
        self.routes.read().resolve(path).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.read().contains(name)
    }

    pub fn route_names(&self) -> Vec<String> {
        self.routes
            .read()
            .iter()
            .map(|route| route.name().to_string())
            .collect()
    }

    pub(crate) fn add(&self, route: PageRoute) -> Result<(), RouterError> {
        self.routes.write().add(route)?;
        Ok(())
    }

    pub(crate) fn remove(&self, name: &str) -> Option<PageRoute> {
        self.routes.write().remove(name)
    }

    pub(crate) fn clear(&self) {
        self.routes.write().clear();
    }
}

impl fmt::Debug for Links {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("config", &*self.config.read())
            .field("routes", &self.route_names())
            .finish()
    }
}
