use crate::api::{Payload, Resource};
use crate::clients::{decode, ClientContext, Mutation, ResourceClient};
use crate::model::{AccountStatus, Role, UserProfile, UserUpdate};
use async_trait::async_trait;
use list_sync::QueryError;
use tracing::instrument;

/// Client for user accounts. Only role and status can be changed here.
#[derive(Clone)]
pub struct UserClient {
    ctx: ClientContext,
}

impl UserClient {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: &str, update: UserUpdate) -> Result<UserProfile, QueryError> {
        let body = serde_json::to_value(&update)?;
        let value = self
            .ctx
            .run_mutation(
                Mutation::UpdateUser,
                Some(id),
                self.ctx.api.update(Resource::Users, id, Payload::Json(body)),
            )
            .await?;
        decode(value)
    }

    pub async fn set_role(&self, id: &str, role: Role) -> Result<UserProfile, QueryError> {
        self.update(id, UserUpdate::role(role)).await
    }

    pub async fn set_status(
        &self,
        id: &str,
        status: AccountStatus,
    ) -> Result<UserProfile, QueryError> {
        self.update(id, UserUpdate::status(status)).await
    }
}

#[async_trait]
impl ResourceClient for UserClient {
    type Item = UserProfile;
    const RESOURCE: Resource = Resource::Users;

    fn context(&self) -> &ClientContext {
        &self.ctx
    }
}
