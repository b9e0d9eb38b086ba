//! # List Sync
//!
//! Building blocks for list screens whose filter, sort and page state lives
//! in the query string. The same pattern backs every resource screen of an
//! admin client: the URL is the state, keystrokes are debounced before they
//! reach it, remote fetches are cached and deduplicated per query, and
//! mutations invalidate what they touched.
//!
//! ## Architecture Overview
//!
//! ```text
//! keystrokes -> Debouncer -> ParamStore (query string) -> ListController
//!                                                            |
//!                                   QueryClient <------------+
//!                                       |
//!                                   QueryCache actor -> Fetcher (transport)
//!
//! mutation -> transport -> QueryClient::invalidate -> CacheEvent -> refetch
//! ```
//!
//! 1. **Parameter store** ([`ParamStore`]) - the single writer of the query
//!    string. Reads are synchronous snapshots; writes are serialized.
//! 2. **Debouncer** ([`Debouncer`]) - commits the search keyword once input
//!    has been quiet for the full delay.
//! 3. **Query cache** ([`QueryCache`] + [`QueryClient`]) - one actor owns every
//!    entry and every in-flight request. Identical concurrent fetches share a
//!    single request.
//! 4. **Invalidation** ([`KeyPattern`], [`InvalidationMap`]) - flags entries
//!    stale and tells live screens to refetch.
//! 5. **View** ([`ListState`], [`render_table`]) - the screen state machine and
//!    the pure table mapping.
//! 6. **Controller** ([`ListController`]) - wires 1-5 together for one
//!    [`ListResource`].
//!
//! ## Concurrency Model
//!
//! - The parameter store and the cache each run in their own Tokio task and
//!   process their mailbox sequentially, so neither needs a lock.
//! - `invalidate` resolves only after the cache applied it: a fetch issued
//!   afterwards never sees the old entry.
//! - Responses are tagged per controller; one that arrives for a query the
//!   screen has moved away from is dropped, never rendered.
//!
//! ## Example
//!
//! ```rust
//! use list_sync::mock::MockFetcher;
//! use list_sync::{
//!     CacheKey, ControllerOptions, ListController, ListQuery, ListResource, ParamActor,
//!     Params, QueryCache,
//! };
//! use serde::Deserialize;
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[derive(Clone, Debug, Deserialize)]
//! struct User { id: String }
//!
//! impl ListResource for User {
//!     const NAME: &'static str = "users";
//!     fn id(&self) -> &str { &self.id }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let query = ListQuery::new(&User::defaults());
//!     let mock = MockFetcher::new();
//!     mock.expect(CacheKey::list("users", query))
//!         .return_ok(json!({ "data": [{ "id": "u1" }], "total": 1, "page": 1, "limit": 10 }));
//!
//!     let (params_actor, params) = ParamActor::new(Params::default(), 16);
//!     tokio::spawn(params_actor.run());
//!     let (cache, client) = QueryCache::new(mock, 16, Duration::from_secs(15));
//!     tokio::spawn(cache.run());
//!
//!     let users = ListController::<User>::spawn(params, client, ControllerOptions::for_resource::<User>());
//!     let state = users.wait_until_settled().await.unwrap();
//!     assert_eq!(state.render().rows.len(), 1);
//! }
//! ```
//!
//! ## Testing
//!
//! [`mock::MockFetcher`] scripts per-key responses, delays and held answers,
//! and counts calls, so cache and controller behavior can be asserted
//! without a server.

pub mod actor;
pub mod client;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod fetcher;
pub mod invalidation;
pub mod message;
pub mod mock;
pub mod params;
pub mod query;
pub mod resource;
pub mod view;

// Re-export core types for convenience
pub use actor::QueryCache;
pub use client::QueryClient;
pub use controller::{ControllerOptions, ListController, DEFAULT_DEBOUNCE};
pub use debounce::Debouncer;
pub use error::QueryError;
pub use fetcher::Fetcher;
pub use invalidation::{InvalidationMap, KeyPattern, Target};
pub use message::{CacheEvent, CacheKey, CacheStatus, KeyScope, Response};
pub use params::{ParamActor, ParamOp, ParamStore, Params};
pub use query::{FilterSpec, FilterValue, ListDefaults, ListQuery, ListResult, SortOrder};
pub use resource::ListResource;
pub use view::{render_table, ListState, TableEvent, TableView};
