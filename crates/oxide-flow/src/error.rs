//! Error types for routing.

use thiserror::Error;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// No static or dynamic route matched the request path.
    #[error("no route matched: {method} {path}")]
    NotFound { method: String, path: String },

    /// A route group matched the path but has no entry for the method.
    #[error("method not allowed: {method} for {path}")]
    MethodNotAllowed {
        method: String,
        path: String,
        /// Methods the matched group does accept.
        allowed: Vec<String>,
    },

    /// A route was registered with a method the router cannot serve.
    #[error("unsupported http method {0}")]
    UnsupportedMethod(String),

    /// The path template produced a pattern the matcher rejects.
    #[error("invalid path pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A path template declares the same parameter name twice.
    #[error("duplicate parameter :{name} in path pattern {pattern}")]
    DuplicateParam { pattern: String, name: String },

    /// The request body could not be decoded.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

impl RouterError {
    /// Returns true for errors produced while resolving a request
    /// (as opposed to configuration errors raised at setup time).
    #[must_use]
    pub const fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::MethodNotAllowed { .. })
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
