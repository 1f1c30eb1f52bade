use thiserror::Error;

/// Errors raised while building the route table
#[derive(Debug, Error)]
pub enum RouteError {
    /// A route with the same name is already registered
    #[error("route `{name}` is already registered")]
    DuplicateRoute { name: String },

    /// The path expression could not be compiled into a matcher
    #[error("path expression `{expression}` cannot be compiled")]
    InvalidPattern {
        expression: String,
        #[source]
        source: regex::Error,
    },
}
