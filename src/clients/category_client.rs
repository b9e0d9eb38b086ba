use crate::api::{Payload, Resource};
use crate::clients::{decode, ClientContext, Mutation, ResourceClient};
use crate::model::{Category, CategoryForm, PICKER_LIMIT};
use async_trait::async_trait;
use list_sync::{ListQuery, ListResource, QueryError};
use tracing::instrument;

#[derive(Clone)]
pub struct CategoryClient {
    ctx: ClientContext,
}

impl CategoryClient {
    pub fn new(ctx: ClientContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, form: CategoryForm) -> Result<Category, QueryError> {
        form.check()?;
        let value = self
            .ctx
            .run_mutation(
                Mutation::CreateCategory,
                None,
                self.ctx
                    .api
                    .create(Resource::Categories, Payload::Json(form.to_body())),
            )
            .await?;
        decode(value)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: &str, form: CategoryForm) -> Result<Category, QueryError> {
        form.check()?;
        let value = self
            .ctx
            .run_mutation(
                Mutation::UpdateCategory,
                Some(id),
                self.ctx
                    .api
                    .update(Resource::Categories, id, Payload::Json(form.to_body())),
            )
            .await?;
        decode(value)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), QueryError> {
        self.ctx
            .run_mutation(
                Mutation::DeleteCategory,
                Some(id),
                self.ctx.api.delete(Resource::Categories, id),
            )
            .await
    }

    /// The options of the category select in book forms.
    #[instrument(skip(self))]
    pub async fn picker(&self) -> Result<Vec<Category>, QueryError> {
        let query = ListQuery::new(&Category::defaults()).with_limit(PICKER_LIMIT);
        Ok(self.list(&query).await?.data)
    }
}

#[async_trait]
impl ResourceClient for CategoryClient {
    type Item = Category;
    const RESOURCE: Resource = Resource::Categories;

    fn context(&self) -> &ClientContext {
        &self.ctx
    }
}
