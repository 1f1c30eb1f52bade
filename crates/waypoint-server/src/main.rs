mod pages;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router as HttpRouter,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use waypoint::{
    Config, Dictionary, EventDispatcher, Links, NavigationAction, PageManager, PageServices,
    RegistryPageFactory, RouteOverrides, RouteResponse, Router, RouterEvent, ServerPageRenderer,
    ServerPlatform,
};

/// Application state shared across requests
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    factory: Arc<RegistryPageFactory>,
    renderer: Arc<ServerPageRenderer>,
    dictionary: Dictionary,
    links: Links,
}

impl AppState {
    /// Builds the route table once; every request routes against it
    fn new(config: Config) -> anyhow::Result<Self> {
        let factory = Arc::new(pages::factory());
        let renderer = Arc::new(ServerPageRenderer::default());
        let links = Links::new();

        let platform = Arc::new(ServerPlatform::new("/"));
        let services = PageServices::new().with_links(links.clone());
        let manager = PageManager::new(
            factory.clone(),
            renderer.clone(),
            platform.clone(),
            services,
            &config.page,
        );
        let mut router = Router::new(manager, Arc::new(EventDispatcher::new()), platform);
        router.init(config.router.clone());
        pages::register_routes(&mut router)?;
        info!(routes = ?links.route_names(), "route table built");

        Ok(Self {
            config: Arc::new(config),
            factory,
            renderer,
            dictionary: pages::dictionary(),
            links,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var("WAYPOINT_CONFIG").unwrap_or_else(|_| "waypoint.toml".to_string());
    let config = Config::load(&config_path).unwrap_or_else(|err| {
        warn!(error = %err, path = %config_path, "failed to load config, using defaults");
        Config::default()
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = HttpRouter::new()
        .fallback(render_page)
        .with_state(AppState::new(config)?)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "waypoint server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn render_page(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path_and_query().map_or("/", |p| p.as_str()).to_string();
    match dispatch(&state, &path).await {
        Ok(response) => into_http(response),
        Err(err) => {
            error!(error = %err, path = %path, "request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}

/// Route one request through a fresh page manager over the shared route table
async fn dispatch(state: &AppState, path: &str) -> anyhow::Result<RouteResponse> {
    let platform = Arc::new(ServerPlatform::new(path));
    let services = PageServices::new()
        .with_links(state.links.clone())
        .with_dictionary(state.dictionary.clone());
    let manager = PageManager::new(
        state.factory.clone(),
        state.renderer.clone(),
        platform.clone(),
        services,
        &state.config.page,
    );

    let dispatcher = Arc::new(EventDispatcher::new());
    dispatcher.listen(RouterEvent::AfterHandleRoute, |event| {
        debug!(
            route = %event.route,
            status = ?event.response.as_ref().map(|response| response.status),
            "page handled"
        );
    });

    let mut router = Router::new(manager, dispatcher, platform);
    let path = router.get_path();
    let response = router
        .route(&path, RouteOverrides::default(), NavigationAction::Initial)
        .await;
    router.destroy();
    response
}

fn into_http(response: RouteResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match (response.redirect, response.content) {
        (Some(location), _) => (status, [(header::LOCATION, location)]).into_response(),
        (None, Some(content)) => (status, Html(content)).into_response(),
        (None, None) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use waypoint::RouteParams;

    async fn get(path: &str) -> RouteResponse {
        let state = AppState::new(Config::default()).unwrap();
        dispatch(&state, path).await.unwrap()
    }

    #[tokio::test]
    async fn test_requests_share_one_route_table() {
        let state = AppState::new(Config::default()).unwrap();
        let routes = state.links.route_names();
        assert!(routes.contains(&"user".to_string()));

        for path in ["/", "/users/2", "/nope"] {
            dispatch(&state, path).await.unwrap();
        }

        assert_eq!(state.links.route_names(), routes);
        assert_eq!(
            state.links.link("user", &RouteParams::from([("id".to_string(), json!(2))])).unwrap(),
            "http://localhost:3000/users/2"
        );
    }

    #[tokio::test]
    async fn test_home_links_to_users() {
        let response = get("/").await;
        assert_eq!(response.status, 200);
        let html = response.content.unwrap();
        assert!(html.contains("<title>Waypoint</title>"));
        assert!(html.contains(r#"href="http://localhost:3000/users/2""#));
    }

    #[tokio::test]
    async fn test_user_page_waits_for_activity() {
        let response = get("/users/2/posts").await;
        assert_eq!(response.status, 200);
        let html = response.content.unwrap();
        assert!(html.contains("<h1>Grace</h1>"));
        assert!(html.contains("Tab: posts"));
        assert!(html.contains("<li>2 signed in</li>"));
        assert!(html.contains("<title>Grace | Waypoint</title>"));
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let response = get("/users/99").await;
        assert_eq!(response.status, 404);
        assert!(response.content.unwrap().contains("no user with id 99"));
    }

    #[tokio::test]
    async fn test_unmatched_path_is_not_found() {
        let response = get("/nope").await;
        assert_eq!(response.status, 404);
        assert!(response.content.unwrap().contains("Nothing lives at /nope"));
    }

    #[tokio::test]
    async fn test_moved_page_redirects() {
        let response = into_http(get("/index.html").await);
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "http://localhost:3000/"
        );
    }
}
