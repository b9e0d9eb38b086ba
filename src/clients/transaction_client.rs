use crate::api::{Payload, Resource};
use crate::clients::{decode, ClientContext, Mutation, ResourceClient};
use crate::model::{BorrowTransaction, TransactionStatus, TransactionUpdate};
use async_trait::async_trait;
use chrono::Utc;
use list_sync::QueryError;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct TransactionClient {
    ctx: ClientContext,
}

impl TransactionClient {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: &str,
        update: TransactionUpdate,
    ) -> Result<BorrowTransaction, QueryError> {
        let body = serde_json::to_value(&update)?;
        debug!(%body, "update called");
        let value = self
            .ctx
            .run_mutation(
                Mutation::UpdateTransaction,
                Some(id),
                self.ctx
                    .api
                    .update(Resource::Transactions, id, Payload::Json(body)),
            )
            .await?;
        decode(value)
    }

    /// Moves a borrow to `status`, stamping the return date when it comes back.
    pub async fn set_status(
        &self,
        id: &str,
        status: TransactionStatus,
    ) -> Result<BorrowTransaction, QueryError> {
        self.update(id, TransactionUpdate::status(status, Utc::now()))
            .await
    }
}

#[async_trait]
impl ResourceClient for TransactionClient {
    type Item = BorrowTransaction;
    const RESOURCE: Resource = Resource::Transactions;

    fn context(&self) -> &ClientContext {
        &self.ctx
    }
}
