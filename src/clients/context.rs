use crate::api::AdminApi;
use crate::model::{Book, BorrowTransaction, Category, UserProfile};
use crate::notify::Notifier;
use list_sync::{InvalidationMap, ListResource, QueryClient, QueryError, Target};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Every write the dashboard can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    CreateBook,
    UpdateBook,
    DeleteBook,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    UpdateTransaction,
    UpdateUser,
}

impl Mutation {
    pub fn title(self) -> &'static str {
        match self {
            Mutation::CreateBook | Mutation::UpdateBook | Mutation::DeleteBook => "Book",
            Mutation::CreateCategory | Mutation::UpdateCategory | Mutation::DeleteCategory => {
                "Category"
            }
            Mutation::UpdateTransaction => "Borrow transaction",
            Mutation::UpdateUser => "User",
        }
    }

    fn done(self) -> &'static str {
        match self {
            Mutation::CreateBook | Mutation::CreateCategory => "created",
            Mutation::DeleteBook | Mutation::DeleteCategory => "deleted",
            _ => "updated",
        }
    }
}

/// Which cached keys each mutation makes stale.
///
/// Books embed their category names and transactions embed the borrower, so
/// category and user writes reach into those lists as well.
pub fn invalidation_rules() -> InvalidationMap<Mutation> {
    use Target::{Lists, MutatedItem};

    let books = Book::NAME;
    let categories = Category::NAME;
    let transactions = BorrowTransaction::NAME;
    let users = UserProfile::NAME;

    InvalidationMap::new()
        .rule(Mutation::CreateBook, [Lists(books)])
        .rule(Mutation::UpdateBook, [Lists(books), MutatedItem(books)])
        .rule(Mutation::DeleteBook, [Lists(books), MutatedItem(books)])
        .rule(Mutation::CreateCategory, [Lists(categories), Lists(books)])
        .rule(
            Mutation::UpdateCategory,
            [Lists(categories), MutatedItem(categories), Lists(books)],
        )
        .rule(
            Mutation::DeleteCategory,
            [Lists(categories), MutatedItem(categories), Lists(books)],
        )
        .rule(
            Mutation::UpdateTransaction,
            [Lists(transactions), MutatedItem(transactions)],
        )
        .rule(
            Mutation::UpdateUser,
            [Lists(users), MutatedItem(users), Lists(transactions)],
        )
}

/// What every resource client shares: the transport, the cache, the
/// notifier and the invalidation table.
#[derive(Clone)]
pub struct ClientContext {
    pub(crate) api: Arc<dyn AdminApi>,
    pub(crate) cache: QueryClient,
    notifier: Notifier,
    rules: Arc<InvalidationMap<Mutation>>,
}

impl ClientContext {
    pub fn new(api: Arc<dyn AdminApi>, cache: QueryClient, notifier: Notifier) -> Self {
        Self {
            api,
            cache,
            notifier,
            rules: Arc::new(invalidation_rules()),
        }
    }

    pub fn cache(&self) -> &QueryClient {
        &self.cache
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Runs one server write.
    ///
    /// On success the affected keys are invalidated before this returns, so a
    /// fetch issued afterwards never sees pre-mutation data. On failure the
    /// cache is left untouched and an error notice is raised; nothing is
    /// retried.
    pub async fn run_mutation<T, Fut>(
        &self,
        kind: Mutation,
        id: Option<&str>,
        call: Fut,
    ) -> Result<T, QueryError>
    where
        Fut: Future<Output = Result<T, QueryError>>,
    {
        match call.await {
            Ok(value) => {
                let stale = self
                    .cache
                    .invalidate(self.rules.patterns_for(&kind, id))
                    .await?;
                info!(?kind, id = id.unwrap_or("-"), stale, "Mutation applied");
                self.notifier.success(
                    kind.title(),
                    format!("{} {} successfully", kind.title(), kind.done()),
                );
                Ok(value)
            }
            Err(e) => {
                warn!(?kind, id = id.unwrap_or("-"), error = %e, "Mutation failed");
                self.notifier.error(kind.title(), e.to_string());
                Err(e)
            }
        }
    }
}
