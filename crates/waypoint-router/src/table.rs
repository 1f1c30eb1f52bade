/// Named routes and the insertion-ordered table that resolves paths to them
use indexmap::IndexMap;

use crate::error::RouteError;
use crate::params::RouteParams;
use crate::pattern::RoutePattern;

/// A named path pattern bound to an arbitrary target
///
/// The target is whatever the application dispatches to (for the page
/// kernel: controller, view and navigation options). Routes are immutable
/// once built.
#[derive(Debug, Clone)]
pub struct Route<T> {
    name: String,
    pattern: RoutePattern,
    target: T,
}

impl<T> Route<T> {
    /// Compiles `expression` and binds it to `target` under `name`
    ///
    /// # Examples
    ///
    /// ```
    /// use waypoint_router::Route;
    ///
    /// let route = Route::new("user", "/user/:id", "UserController").unwrap();
    /// assert_eq!(route.name(), "user");
    /// assert!(route.matches("/user/7"));
    /// ```
    pub fn new(
        name: impl Into<String>,
        expression: &str,
        target: T,
    ) -> Result<Self, RouteError> {
        Ok(Self {
            name: name.into(),
            pattern: RoutePattern::compile(expression)?,
            target,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// The expression the route was declared with
    pub fn path_expression(&self) -> &str {
        self.pattern.expression()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }

    pub fn extract_parameters(&self, path: &str) -> RouteParams {
        self.pattern.extract_parameters(path)
    }

    pub fn to_path(&self, params: &RouteParams) -> String {
        self.pattern.to_path(params)
    }
}

/// Insertion-ordered registry of named routes
///
/// Resolution is a linear scan in insertion order: routes added earlier
/// shadow later, more general ones.
///
/// # Examples
///
/// ```
/// use waypoint_router::{Route, RouteTable};
///
/// let mut table = RouteTable::new();
/// table.add(Route::new("new", "/users/new", "create").unwrap()).unwrap();
/// table.add(Route::new("detail", "/users/:id", "show").unwrap()).unwrap();
///
/// assert_eq!(table.resolve("/users/new").map(|r| r.name()), Some("new"));
/// assert_eq!(table.resolve("/users/42").map(|r| r.name()), Some("detail"));
/// assert!(table.resolve("/teams").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RouteTable<T> {
    routes: IndexMap<String, Route<T>>,
}

impl<T> RouteTable<T> {
    pub fn new() -> Self {
        Self {
            routes: IndexMap::new(),
        }
    }

    /// Adds a route; fails without touching the table when the name is taken
    pub fn add(&mut self, route: Route<T>) -> Result<&Route<T>, RouteError> {
        if self.routes.contains_key(route.name()) {
            return Err(RouteError::DuplicateRoute {
                name: route.name().to_string(),
            });
        }

        tracing::debug!(
            name = route.name(),
            expression = route.path_expression(),
            "route registered"
        );
        let route: &Route<T> = self.routes.entry(route.name().to_string()).or_insert(route);
        Ok(route)
    }

    /// Removes a route by name; removing an unknown name is a no-op
    pub fn remove(&mut self, name: &str) -> Option<Route<T>> {
        self.routes.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Route<T>> {
        self.routes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// First route, in insertion order, matching `path`
    pub fn resolve(&self, path: &str) -> Option<&Route<T>> {
        self.routes.values().find(|route| route.matches(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route<T>> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
