//! # Waypoint Router
//!
//! Named routes built from path expressions:
//! - Literal segments (`/about`)
//! - Required placeholders (`/users/:id`)
//! - Optional placeholders (`/posts/:id/:?tab`)
//! - Sub-segment placeholders (`/files/:name.:ext`)
//! - Query strings layered on top of path parameters (`/search?q=rust&draft`)
//!
//! ## Matching
//!
//! Each route compiles its expression once into an anchored matcher.
//! A path matches with or without one loose leading/trailing `/`, and
//! everything after the first `?` is an optional query string that the
//! path matcher does not parse.
//!
//! ## Resolution
//!
//! [`RouteTable`] keeps routes in insertion order and resolves a path to
//! the first matching route, so specific routes must be added before
//! general ones.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use waypoint_router::{Route, RouteParams, RouteTable};
//!
//! let mut table = RouteTable::new();
//! table.add(Route::new("home", "/", "HomePage").unwrap()).unwrap();
//! table.add(Route::new("user", "/user/:userId/:?tab", "UserPage").unwrap()).unwrap();
//!
//! let route = table.resolve("/user/12?sort=desc").unwrap();
//! assert_eq!(route.name(), "user");
//!
//! let params = route.extract_parameters("/user/12?sort=desc");
//! assert_eq!(params.get("userId"), Some(&json!("12")));
//! assert_eq!(params.get("tab"), Some(&json!(null)));
//! assert_eq!(params.get("sort"), Some(&json!("desc")));
//!
//! let link = route.to_path(&RouteParams::from([("userId".to_string(), json!(3))]));
//! assert_eq!(link, "/user/3");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod error;
pub mod params;
pub mod path;
pub mod pattern;
mod table;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::RouteError;
pub use params::RouteParams;
pub use pattern::{ParamToken, PatternToken, RoutePattern};
pub use table::{Route, RouteTable};
