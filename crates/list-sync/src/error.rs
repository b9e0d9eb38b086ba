//! # Query Errors
//!
//! The failure taxonomy shared by the cache, the transports that feed it, and
//! local form validation. Errors are `Clone` because a single fetch result is
//! fanned out to every caller waiting on the same key.

use std::collections::BTreeMap;

/// Errors surfaced by a fetch, a mutation or a local validation pass.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum QueryError {
    /// No response was received (connection failure, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a 4xx/5xx status.
    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    /// Local validation rejected the input before it reached the network.
    #[error("Validation failed: {fields:?}")]
    Validation { fields: BTreeMap<String, String> },

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Query cache closed")]
    CacheClosed,

    #[error("Query cache dropped response channel")]
    CacheDropped,

    #[error("Parameter store closed")]
    StoreClosed,
}

impl QueryError {
    /// Builds a validation error for a single field.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.into(), message.into());
        QueryError::Validation { fields }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::NotFound(_))
    }

    /// The per-field messages of a validation error, if this is one.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            QueryError::Validation { fields } => Some(fields),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        QueryError::Decode(e.to_string())
    }
}
