//! Error types for the server.

use thiserror::Error;

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be parsed.
    #[error("invalid listen address: {0}")]
    InvalidAddress(String),

    /// Binding or accepting failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Route registration failed.
    #[error(transparent)]
    Router(#[from] oxide_flow::RouterError),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
