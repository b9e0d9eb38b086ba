use crate::api::{Payload, Resource};
use crate::clients::{decode, ClientContext, Mutation, ResourceClient};
use crate::model::{Book, BookForm};
use async_trait::async_trait;
use list_sync::QueryError;
use tracing::{debug, instrument};

/// Client for the book catalogue.
///
/// Forms are validated locally first; a rejected form never reaches the
/// server and raises no notice.
#[derive(Clone)]
pub struct BookClient {
    ctx: ClientContext,
    max_cover_bytes: usize,
}

impl BookClient {
    pub fn new(ctx: ClientContext, max_cover_bytes: usize) -> Self {
        Self {
            ctx,
            max_cover_bytes,
        }
    }

    fn payload(form: BookForm) -> Payload {
        Payload::Multipart {
            fields: form.text_fields(),
            cover: form.cover,
        }
    }

    #[instrument(skip(self, form), fields(title = %form.title))]
    pub async fn create(&self, form: BookForm) -> Result<Book, QueryError> {
        form.check(self.max_cover_bytes)?;
        debug!(categories = ?form.categories, cover = form.cover.is_some(), "create called");
        let value = self
            .ctx
            .run_mutation(
                Mutation::CreateBook,
                None,
                self.ctx.api.create(Resource::Books, Self::payload(form)),
            )
            .await?;
        decode(value)
    }

    /// Replaces the book's fields. A form without a cover keeps the current one.
    #[instrument(skip(self, form))]
    pub async fn update(&self, id: &str, form: BookForm) -> Result<Book, QueryError> {
        form.check(self.max_cover_bytes)?;
        debug!(categories = ?form.categories, cover = form.cover.is_some(), "update called");
        let value = self
            .ctx
            .run_mutation(
                Mutation::UpdateBook,
                Some(id),
                self.ctx.api.update(Resource::Books, id, Self::payload(form)),
            )
            .await?;
        decode(value)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), QueryError> {
        self.ctx
            .run_mutation(
                Mutation::DeleteBook,
                Some(id),
                self.ctx.api.delete(Resource::Books, id),
            )
            .await
    }
}

#[async_trait]
impl ResourceClient for BookClient {
    type Item = Book;
    const RESOURCE: Resource = Resource::Books;

    fn context(&self) -> &ClientContext {
        &self.ctx
    }
}
