//! # Library Admin
//!
//! > **A headless client for the library-management admin dashboard.**
//!
//! Books, categories, borrow transactions and users are each shown as a
//! paginated, filterable list whose state lives in the query string. This
//! crate supplies the domain on top of the generic [`list_sync`] framework:
//! resource models and forms, the REST transport, typed clients whose
//! mutations invalidate the cache, and the route loaders that gate the
//! dashboard on the signed-in profile.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### The URL is the state
//! A list screen never keeps its own copy of the keyword, filters, sort or
//! page. It decodes them from the [`ParamStore`](list_sync::ParamStore) and
//! writes back through it, so a copied link reproduces the exact screen.
//!
//! ### Actors own shared state
//! The parameter store and the query cache each run as an actor with a
//! sequential mailbox. Everything else talks to them through cloneable
//! handles, never through locks or globals.
//!
//! ### Writes invalidate, they do not patch
//! A successful mutation flags the affected cache keys stale through one
//! declarative table ([`clients::invalidation_rules`]). Open screens refetch;
//! nothing edits cached pages in place.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Orchestrator ([`lifecycle`])
//! - **Role**: starts the actors, wires the clients and runs the route loader
//!   before each navigation.
//! - **Key items**: [`DashboardSystem`](lifecycle::DashboardSystem),
//!   [`setup_tracing`](lifecycle::setup_tracing).
//!
//! ### 2. The Interface ([`clients`])
//! - **Role**: typed reads through the cache and mutations with validation,
//!   invalidation and notices.
//! - **Key items**: [`BookClient`](clients::BookClient),
//!   [`CategoryClient`](clients::CategoryClient),
//!   [`TransactionClient`](clients::TransactionClient),
//!   [`UserClient`](clients::UserClient).
//!
//! ### 3. The Transport ([`api`])
//! - **Role**: the [`AdminApi`](api::AdminApi) seam, its reqwest
//!   implementation and the cache fetcher adapter.
//!
//! ### 4. The Session ([`auth`])
//! - **Role**: the [`AuthStore`](auth::AuthStore) and the
//!   [`auth_loader`](auth::auth_loader) / [`non_auth_loader`](auth::non_auth_loader) pair.
//!
//! ### 5. The Domain ([`model`])
//! - **Role**: what the server returns and what the forms send.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! LIBRARY_ADMIN__API_URL=http://localhost:3000/api RUST_LOG=info \
//!     cargo run -- list books --query "categories=c1&page=2"
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test --workspace
//! ```

pub mod api;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod notify;

pub use error::AdminError;
