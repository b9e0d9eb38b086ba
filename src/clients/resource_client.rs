use crate::api::Resource;
use crate::clients::ClientContext;
use async_trait::async_trait;
use list_sync::{ListQuery, ListResource, ListResult, QueryError};

/// Read operations shared by every resource client.
///
/// Reads go through the query cache, so identical concurrent calls share one
/// request and recent results are served without a round trip.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    type Item: ListResource;

    /// Which REST collection this client writes to.
    const RESOURCE: Resource;

    fn context(&self) -> &ClientContext;

    /// One page of the collection.
    #[tracing::instrument(skip(self, query))]
    async fn list(&self, query: &ListQuery) -> Result<ListResult<Self::Item>, QueryError> {
        tracing::debug!(
            resource = <Self::Item as ListResource>::NAME,
            query = %query.to_query_string(),
            "Sending request"
        );
        self.context()
            .cache()
            .fetch_list(<Self::Item as ListResource>::NAME, query)
            .await
    }

    /// A single item; `QueryError::NotFound` when the server has no such id.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: &str) -> Result<Self::Item, QueryError> {
        tracing::debug!(resource = <Self::Item as ListResource>::NAME, "Sending request");
        self.context()
            .cache()
            .fetch_item(<Self::Item as ListResource>::NAME, id)
            .await
    }
}
