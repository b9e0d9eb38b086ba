//! # Admin API
//!
//! The transport seam of the dashboard. [`AdminApi`] is what every client and
//! loader talks to; [`HttpApi`] implements it over reqwest, and tests plug in
//! an in-memory fake. [`ApiFetcher`] adapts it to the query cache.

mod http;

pub use http::HttpApi;

use crate::model::{Book, BorrowTransaction, Category, CoverImage, UserProfile};
use async_trait::async_trait;
use list_sync::{CacheKey, Fetcher, KeyScope, ListQuery, ListResource, QueryError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// The four resources the dashboard manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Resource {
    Books,
    Categories,
    Transactions,
    Users,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Books,
        Resource::Categories,
        Resource::Transactions,
        Resource::Users,
    ];

    /// The cache resource name.
    pub fn name(self) -> &'static str {
        match self {
            Resource::Books => Book::NAME,
            Resource::Categories => Category::NAME,
            Resource::Transactions => BorrowTransaction::NAME,
            Resource::Users => UserProfile::NAME,
        }
    }

    /// REST collection path.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Books => "/admin/books",
            Resource::Categories => "/admin/category",
            Resource::Transactions => "/admin/borrow",
            Resource::Users => "/admin/users",
        }
    }

    /// The dashboard page that lists this resource.
    pub fn route(self) -> &'static str {
        match self {
            Resource::Books => "/book",
            Resource::Categories => "/category",
            Resource::Transactions => "/borrow-transaction",
            Resource::Users => "/user",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A request body.
#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    /// Text parts in order, plus an optional cover file part.
    Multipart {
        fields: Vec<(String, String)>,
        cover: Option<CoverImage>,
    },
}

#[async_trait]
pub trait AdminApi: Send + Sync + 'static {
    /// `GET {path}?{query}`, returning the `{ data, total, page, limit }` body.
    async fn list(&self, resource: Resource, query: &ListQuery) -> Result<Value, QueryError>;

    async fn get(&self, resource: Resource, id: &str) -> Result<Value, QueryError>;

    async fn create(&self, resource: Resource, payload: Payload) -> Result<Value, QueryError>;

    async fn update(
        &self,
        resource: Resource,
        id: &str,
        payload: Payload,
    ) -> Result<Value, QueryError>;

    async fn delete(&self, resource: Resource, id: &str) -> Result<(), QueryError>;

    /// The profile behind the current session.
    async fn profile(&self) -> Result<UserProfile, QueryError>;

    async fn logout(&self) -> Result<(), QueryError>;
}

/// Feeds the query cache from an [`AdminApi`].
#[derive(Clone)]
pub struct ApiFetcher {
    api: Arc<dyn AdminApi>,
}

impl ApiFetcher {
    pub fn new(api: Arc<dyn AdminApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Fetcher for ApiFetcher {
    async fn fetch(&self, key: &CacheKey) -> Result<Value, QueryError> {
        let resource = Resource::from_name(&key.resource)
            .ok_or_else(|| QueryError::NotFound(format!("unknown resource {}", key.resource)))?;
        match &key.scope {
            KeyScope::List(query) => self.api.list(resource, query).await,
            KeyScope::Item(id) => self.api.get(resource, id).await,
        }
    }
}
