//! Top-level error type of the dashboard.

use list_sync::QueryError;
use thiserror::Error;

/// Errors surfaced while wiring or driving the dashboard.
#[derive(Debug, Error)]
pub enum AdminError {
    /// A fetch, mutation or validation failure.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The HTTP transport could not be built.
    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The route loader refused the session.
    #[error("Access denied, redirect to {0}")]
    AccessDenied(String),

    /// The operation does not exist for the resource.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A task of the system failed or panicked.
    #[error("System error: {0}")]
    System(String),
}

impl From<String> for AdminError {
    fn from(msg: String) -> Self {
        AdminError::System(msg)
    }
}
