//! Typed per-resource clients over the shared [`ClientContext`].

pub mod book_client;
pub mod category_client;
pub mod context;
pub mod resource_client;
pub mod transaction_client;
pub mod user_client;

pub use book_client::*;
pub use category_client::*;
pub use context::*;
pub use resource_client::*;
pub use transaction_client::*;
pub use user_client::*;

use list_sync::QueryError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One client per resource, all sharing a context.
#[derive(Clone)]
pub struct AdminClients {
    pub books: BookClient,
    pub categories: CategoryClient,
    pub transactions: TransactionClient,
    pub users: UserClient,
}

impl AdminClients {
    pub fn new(ctx: ClientContext, max_cover_bytes: usize) -> Self {
        Self {
            books: BookClient::new(ctx.clone(), max_cover_bytes),
            categories: CategoryClient::new(ctx.clone()),
            transactions: TransactionClient::new(ctx.clone()),
            users: UserClient::new(ctx),
        }
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, QueryError> {
    Ok(serde_json::from_value(value)?)
}
