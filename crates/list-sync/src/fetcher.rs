//! # Fetcher Trait
//!
//! The seam between the query cache and whatever transport actually talks to
//! the server.

use crate::error::QueryError;
use crate::message::CacheKey;
use async_trait::async_trait;
use serde_json::Value;

/// Resolves a cache key into the raw JSON body the server returned.
///
/// Implementations map transport failures into [`QueryError`]; the cache
/// never retries and never caches an error.
///
/// # Example
///
/// ```rust
/// use list_sync::{CacheKey, Fetcher, KeyScope, QueryError};
/// use async_trait::async_trait;
/// use serde_json::{json, Value};
///
/// struct Static;
///
/// #[async_trait]
/// impl Fetcher for Static {
///     async fn fetch(&self, key: &CacheKey) -> Result<Value, QueryError> {
///         match &key.scope {
///             KeyScope::List(q) => Ok(json!({ "data": [], "total": 0, "page": q.page, "limit": q.limit })),
///             KeyScope::Item(id) => Err(QueryError::NotFound(format!("{}/{}", key.resource, id))),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, key: &CacheKey) -> Result<Value, QueryError>;
}
