//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered
//! by `RUST_LOG` (`info` when unset). Module paths are hidden; the structured
//! fields (`resource`, `key`, `id`, `page`) carry the context instead.
//!
//! ```bash
//! # Mutations, notices and screen lifecycle
//! RUST_LOG=info library-admin list books
//!
//! # Every cache hit, flight and param change
//! RUST_LOG=debug library-admin list books --query "keyword=dune"
//!
//! # Only the cache
//! RUST_LOG=warn,list_sync::actor=debug library-admin list users
//! ```
//!
//! What a list screen looks like at `debug`:
//!
//! ```text
//! DEBUG Fetching key=books?sort=createdAt&order=desc&page=1&limit=10 flight=1
//! DEBUG Joined in-flight request key=books?sort=createdAt&order=desc&page=1&limit=10 waiters=2
//! INFO  Invalidated resources=["books"] stale=3 superseded=0
//! INFO  Mutation applied kind=DeleteBook id="b7" stale=3
//! INFO  Notice title="Book" message="Book deleted successfully"
//! DEBUG Refetching after invalidation resource="books"
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
