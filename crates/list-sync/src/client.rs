//! # Query Client
//!
//! The cloneable handle every screen and every mutation uses to reach the
//! shared [`QueryCache`](crate::QueryCache).

use crate::error::QueryError;
use crate::invalidation::KeyPattern;
use crate::message::{CacheEvent, CacheKey, CacheRequest, CacheStatus};
use crate::query::{ListQuery, ListResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};

/// A type-safe client for the query cache actor.
///
/// Holds only a sender, so cloning is inexpensive. All methods resolve once
/// the actor has processed the request; `invalidate` in particular returns
/// only after every matched entry is flagged, so a fetch issued afterwards
/// always observes it.
#[derive(Clone)]
pub struct QueryClient {
    sender: mpsc::Sender<CacheRequest>,
    events: broadcast::Sender<CacheEvent>,
}

impl QueryClient {
    pub(crate) fn new(
        sender: mpsc::Sender<CacheRequest>,
        events: broadcast::Sender<CacheEvent>,
    ) -> Self {
        Self { sender, events }
    }

    /// Raw JSON for `key`: served from cache when fresh, otherwise fetched
    /// (joining an identical in-flight request if there is one).
    pub async fn fetch(&self, key: CacheKey) -> Result<Arc<Value>, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CacheRequest::Fetch { key, respond_to })
            .await
            .map_err(|_| QueryError::CacheClosed)?;
        response.await.map_err(|_| QueryError::CacheDropped)?
    }

    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &ListQuery,
    ) -> Result<ListResult<T>, QueryError> {
        let value = self.fetch(CacheKey::list(resource, query.clone())).await?;
        Ok(ListResult::<T>::deserialize(value.as_ref())?)
    }

    pub async fn fetch_item<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: &str,
    ) -> Result<T, QueryError> {
        let value = self.fetch(CacheKey::item(resource, id)).await?;
        Ok(T::deserialize(value.as_ref())?)
    }

    /// Flags every entry matched by `patterns` stale. Returns how many were flagged.
    pub async fn invalidate(&self, patterns: Vec<KeyPattern>) -> Result<usize, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CacheRequest::Invalidate {
                patterns,
                respond_to,
            })
            .await
            .map_err(|_| QueryError::CacheClosed)?;
        response.await.map_err(|_| QueryError::CacheDropped)
    }

    /// Every list of `resource`, plus the item entry for `id` when given.
    pub async fn invalidate_resource(
        &self,
        resource: &str,
        id: Option<&str>,
    ) -> Result<usize, QueryError> {
        let mut patterns = vec![KeyPattern::lists(resource)];
        if let Some(id) = id {
            patterns.push(KeyPattern::item(resource, id));
        }
        self.invalidate(patterns).await
    }

    pub async fn status(&self, key: CacheKey) -> Result<CacheStatus, QueryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CacheRequest::Status { key, respond_to })
            .await
            .map_err(|_| QueryError::CacheClosed)?;
        response.await.map_err(|_| QueryError::CacheDropped)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }
}
