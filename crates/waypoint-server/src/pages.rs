// File: src/pages.rs
// Purpose: Demo pages served by waypoint-server

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use maud::{html, Markup};
use serde_json::{json, Value};
use tracing::debug;
use waypoint::{
    Controller, Dictionary, Extension, NavigationError, PageContext, PageRef, PageResources,
    RegistryPageFactory, RouteOptions, RouteParams, Router, RouterError, State, View,
};

const USERS: &[(&str, &str)] = &[("1", "Ada"), ("2", "Grace"), ("3", "Linus")];

static VISITS: AtomicU64 = AtomicU64::new(0);

pub fn factory() -> RegistryPageFactory {
    RegistryPageFactory::new()
        .with_controller("home", || HomePage)
        .with_controller("user", || UserPage)
        .with_controller("moved", || MovedPage)
        .with_controller("notFound", || NotFoundPage)
        .with_controller("error", || ErrorPage)
        .with_extension("visits", || VisitCounter)
        .with_view("home", || HomeView)
        .with_view("user", || UserView)
        .with_view("notFound", || NotFoundView)
        .with_view("error", || ErrorView)
}

pub fn register_routes(router: &mut Router) -> Result<(), RouterError> {
    router
        .add("home", "/", "home", "home", RouteOptions::default())?
        .add(
            "user",
            "/users/:id/:?tab",
            "user",
            "user",
            RouteOptions::new().with_only_update(true),
        )?
        .add("oldHome", "/index.html", "moved", "home", RouteOptions::default())?
        .add("notFound", "/not-found", "notFound", "notFound", RouteOptions::default())?
        .add("error", "/error", "error", "error", RouteOptions::default())?;
    Ok(())
}

pub fn dictionary() -> Dictionary {
    Dictionary::new("en")
        .with_entry("home.title", "Waypoint")
        .with_entry("home.heading", "People")
        .with_entry("user.title", "{name} | Waypoint")
        .with_entry("notFound.message", "Nothing lives at {path}")
}

fn text<'a>(state: &'a State, key: &str) -> &'a str {
    state.get(key).and_then(Value::as_str).unwrap_or_default()
}

struct HomePage;

impl Controller for HomePage {
    fn load(&mut self, page: &PageContext) -> anyhow::Result<PageResources> {
        let mut users = Vec::new();
        for (id, name) in USERS {
            let params = RouteParams::from([("id".to_string(), json!(id))]);
            users.push(json!({ "name": name, "href": page.links().link("user", &params)? }));
        }
        Ok(PageResources::new().with("users", users))
    }

    fn set_meta_params(&self, _loaded: &State, page: &PageContext) {
        let title = page.dictionary().get("home.title", page.params());
        page.meta()
            .set_title(title)
            .set_meta_name("description", "Everyone registered with the demo");
    }
}

struct UserPage;

impl Controller for UserPage {
    fn extensions(&self) -> Vec<PageRef> {
        vec!["visits".into()]
    }

    fn load(&mut self, page: &PageContext) -> anyhow::Result<PageResources> {
        let id = page.param("id").and_then(Value::as_str).unwrap_or_default().to_string();
        let Some((_, name)) = USERS.iter().find(|(user_id, _)| *user_id == id) else {
            return Err(NavigationError::new(format!("no user with id {id}"), 404).into());
        };

        let tab = page.param("tab").cloned().unwrap_or_else(|| json!("profile"));
        Ok(PageResources::new()
            .with("name", *name)
            .with("tab", tab)
            .with_pending("activity", async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(json!([format!("{id} signed in"), format!("{id} updated a profile")]))
            }))
    }

    fn update(&mut self, page: &PageContext, previous: &RouteParams) -> anyhow::Result<PageResources> {
        debug!(from = ?previous.get("id"), to = ?page.param("id"), "updating user page in place");
        self.load(page)
    }

    fn set_meta_params(&self, loaded: &State, page: &PageContext) {
        let params = RouteParams::from([("name".to_string(), json!(text(loaded, "name")))]);
        let title = page.dictionary().get("user.title", &params);
        page.meta().set_title(title);
    }
}

/// Permanently moved: sends visitors to the home route
struct MovedPage;

impl Controller for MovedPage {
    fn load(&mut self, page: &PageContext) -> anyhow::Result<PageResources> {
        let home = page.links().link("home", &RouteParams::new())?;
        Err(NavigationError::redirect(home, 301).into())
    }
}

struct NotFoundPage;

impl Controller for NotFoundPage {
    fn load(&mut self, page: &PageContext) -> anyhow::Result<PageResources> {
        let message = match page.param("path") {
            Some(_) => page.dictionary().get("notFound.message", page.params()),
            None => page.error().map(|err| err.to_string()).unwrap_or_default(),
        };
        Ok(PageResources::new().with("message", message))
    }

    fn set_meta_params(&self, _loaded: &State, page: &PageContext) {
        page.meta().set_title("Not found").set_meta_name("robots", "noindex");
    }

    fn http_status(&self) -> u16 {
        404
    }
}

struct ErrorPage;

impl Controller for ErrorPage {
    fn load(&mut self, page: &PageContext) -> anyhow::Result<PageResources> {
        let message = page.error().map(|err| err.to_string()).unwrap_or_default();
        Ok(PageResources::new().with("message", message))
    }

    fn set_meta_params(&self, _loaded: &State, page: &PageContext) {
        page.meta().set_title("Something went wrong");
    }

    fn http_status(&self) -> u16 {
        500
    }
}

/// Counts user page views into the `visits` state key
struct VisitCounter;

impl Extension for VisitCounter {
    fn allowed_state_keys(&self) -> Vec<String> {
        vec!["visits".to_string()]
    }

    fn load(&mut self, _page: &PageContext) -> anyhow::Result<PageResources> {
        let visits = VISITS.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(PageResources::new().with("visits", visits))
    }

    fn update(&mut self, page: &PageContext, _previous: &RouteParams) -> anyhow::Result<PageResources> {
        self.load(page)
    }
}

struct HomeView;

impl View for HomeView {
    fn render(&self, state: &State, page: &PageContext) -> Markup {
        let users = state.get("users").and_then(Value::as_array).cloned().unwrap_or_default();
        html! {
            h1 { (page.dictionary().get("home.heading", page.params())) }
            ul {
                @for user in &users {
                    li {
                        a href=(user["href"].as_str().unwrap_or("#")) { (user["name"].as_str().unwrap_or_default()) }
                    }
                }
            }
        }
    }
}

struct UserView;

impl View for UserView {
    fn render(&self, state: &State, _page: &PageContext) -> Markup {
        let activity = state.get("activity").and_then(Value::as_array).cloned().unwrap_or_default();
        html! {
            h1 { (text(state, "name")) }
            p.tab { "Tab: " (text(state, "tab")) }
            @if let Some(visits) = state.get("visits") {
                p.visits { "Visits: " (visits) }
            }
            ul.activity {
                @for entry in &activity {
                    li { (entry.as_str().unwrap_or_default()) }
                }
            }
        }
    }
}

struct NotFoundView;

impl View for NotFoundView {
    fn render(&self, state: &State, _page: &PageContext) -> Markup {
        html! {
            h1 { "404" }
            p { (text(state, "message")) }
        }
    }
}

struct ErrorView;

impl View for ErrorView {
    fn render(&self, state: &State, _page: &PageContext) -> Markup {
        html! {
            h1 { "500" }
            pre { (text(state, "message")) }
        }
    }
}
