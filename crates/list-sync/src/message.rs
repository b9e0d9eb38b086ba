//! # Cache Messages
//!
//! Keys and the mailbox protocol between [`QueryClient`](crate::QueryClient)
//! handles and the [`QueryCache`](crate::QueryCache) actor.

use crate::error::QueryError;
use crate::invalidation::KeyPattern;
use crate::query::ListQuery;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the cache.
pub type Response<T> = oneshot::Sender<Result<T, QueryError>>;

/// What a cache entry holds: one page of a list, or a single item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyScope {
    List(ListQuery),
    Item(String),
}

/// Identity of one cached fetch: `(resource, list query)` or `(resource, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub resource: String,
    pub scope: KeyScope,
}

impl CacheKey {
    pub fn list(resource: impl Into<String>, query: ListQuery) -> Self {
        Self {
            resource: resource.into(),
            scope: KeyScope::List(query),
        }
    }

    pub fn item(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            scope: KeyScope::Item(id.into()),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self.scope, KeyScope::List(_))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            KeyScope::List(query) => write!(f, "{}?{}", self.resource, query.to_query_string()),
            KeyScope::Item(id) => write!(f, "{}/{}", self.resource, id),
        }
    }
}

/// Observable state of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Missing,
    Fresh,
    Stale,
    Fetching,
}

/// Broadcast to live list controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Entries of `resource` were flagged stale.
    Invalidated { resource: String },
}

#[derive(Debug)]
pub enum CacheRequest {
    Fetch {
        key: CacheKey,
        respond_to: Response<Arc<Value>>,
    },
    Invalidate {
        patterns: Vec<KeyPattern>,
        respond_to: oneshot::Sender<usize>,
    },
    Status {
        key: CacheKey,
        respond_to: oneshot::Sender<CacheStatus>,
    },
    /// Posted by a flight task back to the actor that spawned it.
    Completed {
        flight: u64,
        result: Result<Value, QueryError>,
    },
}
