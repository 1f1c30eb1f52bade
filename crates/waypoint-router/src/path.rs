/// Path utilities shared by the pattern compiler and the route table
///
/// All functions are **pure**: given same input, always produce same output with no side effects.
use std::borrow::Cow;

/// Removes a single leading and a single trailing `/` (pure function)
///
/// Only one slash is removed on each side, so `//a//` becomes `/a/`.
/// Borrowed input is returned untouched, no allocation happens.
///
/// # Examples
///
/// ```
/// use waypoint_router::path::trim_loose_slashes;
///
/// assert_eq!(trim_loose_slashes("/about/"), "about");
/// assert_eq!(trim_loose_slashes("users/1"), "users/1");
/// assert_eq!(trim_loose_slashes("/"), "");
/// ```
pub fn trim_loose_slashes(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}

/// Splits a path at the first `?` into the path part and the raw query string
///
/// # Examples
///
/// ```
/// use waypoint_router::path::split_query;
///
/// assert_eq!(split_query("/a/b?x=1"), ("/a/b", Some("x=1")));
/// assert_eq!(split_query("/a/b"), ("/a/b", None));
/// ```
pub fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    }
}

/// Canonical form of a generated path: one leading `/`, no trailing `/`
///
/// Returns `Cow::Borrowed` when the input is already canonical.
///
/// # Examples
///
/// ```
/// use waypoint_router::path::canonical_path;
///
/// assert_eq!(canonical_path("home/1/"), "/home/1");
/// assert_eq!(canonical_path("/home/1"), "/home/1");
/// assert_eq!(canonical_path(""), "/");
/// ```
pub fn canonical_path(path: &str) -> Cow<'_, str> {
    let trimmed = trim_loose_slashes(path);
    if trimmed.len() + 1 == path.len() && path.starts_with('/') && !trimmed.is_empty() {
        return Cow::Borrowed(path);
    }

    Cow::Owned(format!("/{}", trimmed))
}

/// Strips `prefix` (the application root plus the language part) from a path
///
/// Paths outside the prefix are returned unchanged.
pub fn strip_route_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return path;
    }

    path.strip_prefix(prefix).unwrap_or(path)
}
