//! The dispatch protocol: resolve a path to a route, hand it to the page
//! manager, and recover from failures.
//!
//! Failures are classified by the status a [`NavigationError`] carries:
//! - 4xx: render the `notFound` route
//! - 3xx with a target URL: redirect
//! - anything else: render the `error` route
//!
//! A failure while rendering `notFound` or `error` is returned to the caller.

mod links;

pub use links::Links;

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::json;
use tracing::{debug, error, info, warn};
use waypoint_router::path::strip_route_prefix;
use waypoint_router::{Route, RouteParams};

use crate::config::RouterConfig;
use crate::dispatcher::{Dispatcher, RouteEventData, RouterEvent};
use crate::error::{status_of, NavigationError, RouterError, SharedError};
use crate::navigation::NavigationAction;
use crate::options::{RouteOptions, RouteOverrides};
use crate::page_manager::{PageManager, PageRequest};
use crate::page_ref::PageRef;
use crate::platform::{Platform, PlatformKind};
use crate::response::RouteResponse;

/// Route rendered when no route matches or a page fails with a 4xx
pub const NOT_FOUND_ROUTE: &str = "notFound";
/// Route rendered when a page fails with anything but a 3xx/4xx
pub const ERROR_ROUTE: &str = "error";
/// Redirects followed within one navigation before giving up
pub const MAX_REDIRECTS: usize = 10;

const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// What a route dispatches to
#[derive(Debug, Clone)]
pub struct PageTarget {
    pub controller: PageRef,
    pub view: PageRef,
    pub options: RouteOptions,
}

pub type PageRoute = Route<PageTarget>;

/// The route matching the current path
#[derive(Debug, Clone)]
pub struct RouteInfo {
    pub route: PageRoute,
    pub params: RouteParams,
    pub path: String,
}

pub struct Router {
    links: Links,
    page_manager: PageManager,
    dispatcher: Arc<dyn Dispatcher>,
    platform: Arc<dyn Platform>,
    currently_routed_path: String,
}

impl Router {
    /// Build a router sharing its route table with the page manager's services.
    pub fn new(page_manager: PageManager, dispatcher: Arc<dyn Dispatcher>, platform: Arc<dyn Platform>) -> Self {
        Self {
            links: page_manager.services().links().clone(),
            page_manager,
            dispatcher,
            platform,
            currently_routed_path: String::new(),
        }
    }

    pub fn init(&mut self, config: RouterConfig) -> &mut Self {
        info!(protocol = %config.protocol, host = %config.host, root = %config.root, "router configured");
        self.links.configure(config);
        self
    }

    /// Register a route; names must be unique.
    pub fn add(
        &mut self,
        name: &str,
        path_expression: &str,
        controller: impl Into<PageRef>,
        view: impl Into<PageRef>,
        options: RouteOptions,
    ) -> Result<&mut Self, RouterError> {
        let route = Route::new(
            name,
            path_expression,
            PageTarget {
                controller: controller.into(),
                view: view.into(),
                options,
            },
        )?;
        self.links.add(route)?;
        debug!(name, path_expression, "route added");
        Ok(self)
    }

    pub fn remove(&mut self, name: &str) -> &mut Self {
        if self.links.remove(name).is_some() {
            debug!(name, "route removed");
        }
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.links.clear();
        self
    }

    pub fn links(&self) -> &Links {
        &self.links
    }

    pub fn page_manager(&self) -> &PageManager {
        &self.page_manager
    }

    pub fn page_manager_mut(&mut self) -> &mut PageManager {
        &mut self.page_manager
    }

    pub fn get_protocol(&self) -> String {
        self.links.config().protocol
    }

    pub fn get_host(&self) -> String {
        self.links.config().host
    }

    pub fn get_domain(&self) -> String {
        self.links.domain()
    }

    pub fn get_root(&self) -> String {
        self.links.config().root
    }

    pub fn get_language_part_path(&self) -> String {
        self.links.config().language_part_path
    }

    pub fn get_base_url(&self) -> String {
        self.links.base_url()
    }

    /// The platform's current path without the root and language prefix
    pub fn get_path(&self) -> String {
        let current = self.platform.current_path();
        strip_route_prefix(&current, &self.links.route_prefix()).to_string()
    }

    pub fn get_url(&self) -> String {
        format!("{}{}", self.get_base_url(), self.get_path())
    }

    /// The path of the last dispatch
    pub fn currently_routed_path(&self) -> &str {
        &self.currently_routed_path
    }

    pub fn get_current_route_info(&self) -> Result<RouteInfo, RouterError> {
        let path = self.get_path();
        let route = self
            .links
            .resolve(&path)
            .ok_or_else(|| RouterError::NoRouteForPath(path.clone()))?;
        let params = route.extract_parameters(&path);
        Ok(RouteInfo {
            route,
            params,
            path,
        })
    }

    /// First registered route matching `path`
    pub fn resolve(&self, path: &str) -> Option<PageRoute> {
        self.links.resolve(path)
    }

    pub fn link(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
        self.links.link(name, params)
    }

    /// Resolve `path` and manage its page, recovering from page failures.
    pub fn route(
        &mut self,
        path: &str,
        overrides: RouteOverrides,
        action: NavigationAction,
    ) -> BoxFuture<'_, anyhow::Result<RouteResponse>> {
        self.dispatch(path.to_string(), overrides, action, 0)
    }

    /// Hand `route` to the page manager, notifying observers around it.
    pub async fn handle(
        &mut self,
        route: PageRoute,
        params: RouteParams,
        overrides: RouteOverrides,
        action: NavigationAction,
        error: Option<SharedError>,
    ) -> anyhow::Result<RouteResponse> {
        let target = route.target();
        let options = target.options.merged(&overrides);
        let mut event = RouteEventData {
            route: route.name().to_string(),
            params: params.clone(),
            path: self.currently_routed_path.clone(),
            options: options.clone(),
            action: action.clone(),
            response: None,
        };
        self.dispatcher
            .fire(RouterEvent::BeforeHandleRoute, &event, true);

        let request = PageRequest {
            controller: target.controller.clone(),
            view: target.view.clone(),
            options,
            params,
            error: error.clone(),
            action,
        };
        let mut response = self.page_manager.manage(request).await?;
        if response.error.is_none() {
            response.error = error;
        }

        debug!(route = route.name(), status = response.status, "route handled");
        event.response = Some(response.clone());
        self.dispatcher
            .fire(RouterEvent::AfterHandleRoute, &event, true);

        Ok(response)
    }

    /// Render the `error` route for `error`
    pub async fn handle_error(
        &mut self,
        error: SharedError,
        overrides: RouteOverrides,
    ) -> anyhow::Result<RouteResponse> {
        self.handle_reserved(ERROR_ROUTE, error, overrides).await
    }

    /// Render the `notFound` route for `error`
    pub async fn handle_not_found(
        &mut self,
        error: SharedError,
        overrides: RouteOverrides,
    ) -> anyhow::Result<RouteResponse> {
        self.handle_reserved(NOT_FOUND_ROUTE, error, overrides).await
    }

    /// 4xx
    pub fn is_client_error(error: &anyhow::Error) -> bool {
        status_of(error).is_some_and(|status| (400..500).contains(&status))
    }

    /// 3xx
    pub fn is_redirection(error: &anyhow::Error) -> bool {
        status_of(error).is_some_and(|status| (300..400).contains(&status))
    }

    /// Redirect to `url`.
    ///
    /// On the server the redirect is recorded and returned without rendering.
    /// On a client, same-origin URLs are routed in place and other URLs load
    /// the whole page.
    pub fn redirect(&mut self, url: &str, overrides: RouteOverrides) -> BoxFuture<'_, anyhow::Result<RouteResponse>> {
        self.follow_redirect(url.to_string(), overrides, 1)
    }

    /// Follow a link activated by the user.
    pub fn navigate(&mut self, url: &str) -> BoxFuture<'_, anyhow::Result<RouteResponse>> {
        let url = url.to_string();
        async move {
            let path = match self.same_origin_path(&url) {
                Some(path) if self.platform.kind() == PlatformKind::Client => path,
                _ => return Ok(self.hard_navigate(url, DEFAULT_REDIRECT_STATUS)),
            };

            let allow_spa = self
                .links
                .resolve(&path)
                .map_or(true, |route| route.target().options.allow_spa);
            if !allow_spa {
                return Ok(self.hard_navigate(url, DEFAULT_REDIRECT_STATUS));
            }

            self.platform.push_state(&url);
            self.dispatch(path, RouteOverrides::default(), NavigationAction::Click { url }, 0)
                .await
        }
        .boxed()
    }

    /// Route the history entry the user moved to.
    pub fn handle_pop_state(&mut self, url: &str) -> BoxFuture<'_, anyhow::Result<RouteResponse>> {
        let url = url.to_string();
        let path = self.same_origin_path(&url).unwrap_or_else(|| url.clone());
        self.dispatch(path, RouteOverrides::default(), NavigationAction::PopState { url }, 0)
    }

    pub fn destroy(&mut self) {
        self.page_manager.destroy();
    }

    fn dispatch(
        &mut self,
        path: String,
        overrides: RouteOverrides,
        action: NavigationAction,
        hops: usize,
    ) -> BoxFuture<'_, anyhow::Result<RouteResponse>> {
        async move {
            self.currently_routed_path = path.clone();

            let Some(route) = self.links.resolve(&path) else {
                info!(path = %path, "no route matches path");
                let error: SharedError = Arc::new(NavigationError::not_found(&path).into());
                return self.handle_not_found(error, overrides).await;
            };

            let params = route.extract_parameters(&path);
            debug!(route = route.name(), path = %path, ?action, "dispatching route");
            match self
                .handle(route, params, overrides.clone(), action, None)
                .await
            {
                Ok(response) => Ok(response),
                Err(err) => self.recover(err, overrides, hops).await,
            }
        }
        .boxed()
    }

    fn recover(
        &mut self,
        err: anyhow::Error,
        overrides: RouteOverrides,
        hops: usize,
    ) -> BoxFuture<'_, anyhow::Result<RouteResponse>> {
        async move {
            if Self::is_redirection(&err) {
                let target = err
                    .downcast_ref::<NavigationError>()
                    .and_then(|navigation| navigation.url().map(|url| (url.to_string(), navigation.status())));
                if let Some((url, status)) = target {
                    info!(url = %url, status, "page requested a redirect");
                    let overrides = RouteOverrides {
                        http_status: Some(status),
                        ..overrides
                    };
                    return self.follow_redirect(url, overrides, hops + 1).await;
                }
            }

            let error: SharedError = Arc::new(err);
            if Self::is_client_error(&error) {
                warn!(error = %error, path = %self.currently_routed_path, "client error, rendering not-found page");
                self.handle_not_found(error, overrides).await
            } else {
                error!(error = %error, path = %self.currently_routed_path, "route failed, rendering error page");
                self.handle_error(error, overrides).await
            }
        }
        .boxed()
    }

    fn follow_redirect(
        &mut self,
        url: String,
        overrides: RouteOverrides,
        hops: usize,
    ) -> BoxFuture<'_, anyhow::Result<RouteResponse>> {
        async move {
            if hops > MAX_REDIRECTS {
                error!(url = %url, hops, "redirect loop");
                return Err(RouterError::RedirectLoop {
                    url,
                    limit: MAX_REDIRECTS,
                }
                .into());
            }

            let status = overrides.http_status.unwrap_or(DEFAULT_REDIRECT_STATUS);
            if self.platform.kind() == PlatformKind::Server {
                info!(url = %url, status, "redirecting");
                self.platform.redirect(&url, status);
                return Ok(RouteResponse::redirect(url, status));
            }

            let Some(path) = self.same_origin_path(&url) else {
                return Ok(self.hard_navigate(url, status));
            };
            if overrides.replace_state {
                self.platform.replace_state(&url);
            } else {
                self.platform.push_state(&url);
            }
            self.dispatch(path, overrides, NavigationAction::Redirect { url }, hops)
                .await
        }
        .boxed()
    }

    async fn handle_reserved(
        &mut self,
        name: &'static str,
        error: SharedError,
        overrides: RouteOverrides,
    ) -> anyhow::Result<RouteResponse> {
        let route = self
            .links
            .get(name)
            .ok_or(RouterError::UnconfiguredErrorRoute(name))?;
        let params = error_params(&error);
        self.handle(route, params, overrides, NavigationAction::Error, Some(error))
            .await
    }

    fn hard_navigate(&self, url: String, status: u16) -> RouteResponse {
        info!(url = %url, "full page navigation");
        self.platform.redirect(&url, status);
        RouteResponse::redirect(url, status)
    }

    /// Application path of `url` when it belongs to this application
    fn same_origin_path(&self, url: &str) -> Option<String> {
        let domain = self.links.domain();
        let rest = match url.strip_prefix(domain.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => rest,
            Some(_) => return None,
            None if url.starts_with('/') && !url.starts_with("//") => url,
            None => return None,
        };
        Some(strip_route_prefix(rest, &self.links.route_prefix()).to_string())
    }
}

/// Params handed to the `error`/`notFound` pages
fn error_params(error: &anyhow::Error) -> RouteParams {
    let mut params = RouteParams::new();
    params.insert("error".to_string(), json!(error.to_string()));
    if let Some(navigation) = error.downcast_ref::<NavigationError>() {
        params.insert("status".to_string(), json!(navigation.status()));
        if let Some(path) = navigation.path() {
            params.insert("path".to_string(), json!(path));
        }
    }
    params
}
