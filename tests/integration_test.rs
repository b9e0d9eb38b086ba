mod common;

use chrono::NaiveDate;
use common::{book, category, start, transaction, FakeApi};
use library_admin::api::Resource;
use library_admin::clients::ResourceClient;
use library_admin::model::{
    AccountStatus, Book, BookForm, CategoryForm, TransactionStatus, UserUpdate,
};
use library_admin::notify::Tone;
use list_sync::{ListQuery, ListResource, QueryError};
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;

fn book_query() -> ListQuery {
    ListQuery::new(&Book::defaults())
}

fn new_book_form() -> BookForm {
    BookForm {
        title: "Hyperion".into(),
        description: "Pilgrims".into(),
        author: "Dan Simmons".into(),
        published_date: NaiveDate::from_ymd_opt(1989, 5, 26),
        quantity: 2,
        available: 2,
        categories: vec!["c1".into()],
        cover: None,
    }
}

fn seeded() -> std::sync::Arc<FakeApi> {
    let api = FakeApi::new();
    api.seed(
        Resource::Books,
        vec![
            book("b1", "Dune", &["c1"]),
            book("b2", "Emma", &["c2"]),
            book("b3", "Ulysses", &["c2"]),
        ],
    );
    api.seed(
        Resource::Categories,
        vec![category("c1", "Sci-Fi"), category("c2", "Classics")],
    );
    api
}

/// A create flags book lists stale, so the next read goes back to the server.
#[tokio::test]
async fn test_create_invalidates_book_lists() {
    let api = seeded();
    let system = start(&api);
    let mut notices = system.notifier.subscribe();
    let books = &system.clients.books;

    let first = books.list(&book_query()).await.expect("list books");
    assert_eq!(first.total, 3);

    // Served from cache
    books.list(&book_query()).await.expect("list books");
    assert_eq!(api.list_calls(Resource::Books), 1);

    let created = books.create(new_book_form()).await.expect("create book");
    assert_eq!(created.title, "Hyperion");
    assert_eq!(created.category[0].id, "c1");

    let after = books.list(&book_query()).await.expect("list books");
    assert_eq!(after.total, 4);
    assert_eq!(api.list_calls(Resource::Books), 2);

    let notice = notices.recv().await.expect("notice");
    assert_eq!(notice.tone, Tone::Success);
    assert_eq!(notice.message, "Book created successfully");

    system.shutdown().await.expect("shutdown");
}

/// Deleted items disappear from the refetched list and their item key 404s.
#[tokio::test]
async fn test_delete_then_refetch() {
    let api = seeded();
    let system = start(&api);
    let books = &system.clients.books;

    let item = books.get("b2").await.expect("get b2");
    assert_eq!(item.title, "Emma");
    books.list(&book_query()).await.expect("list books");

    books.delete("b2").await.expect("delete b2");

    let after = books.list(&book_query()).await.expect("list books");
    assert!(after.data.iter().all(|b| b.id != "b2"));
    assert_eq!(after.total, 2);

    let err = books.get("b2").await.expect_err("b2 is gone");
    assert!(err.is_not_found());

    system.shutdown().await.expect("shutdown");
}

/// A failed write leaves the cache alone, raises an error notice and is not retried.
#[tokio::test]
async fn test_failed_mutation_notifies_and_keeps_cache() {
    let api = seeded();
    let system = start(&api);
    let mut notices = system.notifier.subscribe();
    let books = &system.clients.books;

    books.list(&book_query()).await.expect("list books");

    api.fail_next(QueryError::Server {
        status: 500,
        body: "boom".into(),
    });
    let err = books.delete("b1").await.expect_err("delete fails");
    assert_eq!(
        err,
        QueryError::Server {
            status: 500,
            body: "boom".into()
        }
    );
    assert_eq!(api.writes(), 0);

    let list = books.list(&book_query()).await.expect("list books");
    assert_eq!(list.total, 3);
    assert_eq!(api.list_calls(Resource::Books), 1);

    let notice = notices.recv().await.expect("notice");
    assert_eq!(notice.tone, Tone::Error);
    assert_eq!(notice.message, "Server error 500: boom");

    system.shutdown().await.expect("shutdown");
}

/// An invalid form is rejected locally: no request, no notice.
#[tokio::test]
async fn test_invalid_form_never_reaches_server() {
    let api = seeded();
    let system = start(&api);
    let mut notices = system.notifier.subscribe();

    let form = BookForm {
        available: 5,
        quantity: 1,
        ..new_book_form()
    };
    let err = system.clients.books.create(form).await.expect_err("invalid");
    assert_eq!(
        err.field_errors().expect("validation")["available"],
        "Available cannot exceed quantity"
    );

    let err = system
        .clients
        .categories
        .create(CategoryForm::new(" x ", ""))
        .await
        .expect_err("invalid");
    assert!(err.field_errors().expect("validation").contains_key("name"));

    assert_eq!(api.writes(), 0);
    assert!(matches!(notices.try_recv(), Err(TryRecvError::Empty)));

    system.shutdown().await.expect("shutdown");
}

/// Identical concurrent reads share one request.
#[tokio::test]
async fn test_concurrent_reads_share_one_request() {
    let api = seeded();
    api.set_latency(Duration::from_millis(30));
    let system = start(&api);

    let a = system.clients.books.clone();
    let b = system.clients.books.clone();
    let (qa, qb) = (book_query(), book_query());
    let (ra, rb) = tokio::join!(a.list(&qa), b.list(&qb));

    assert_eq!(ra.expect("first"), rb.expect("second"));
    assert_eq!(api.list_calls(Resource::Books), 1);

    system.shutdown().await.expect("shutdown");
}

/// Books embed category names, so a category rename refreshes book lists too.
#[tokio::test]
async fn test_category_update_refreshes_book_lists() {
    let api = seeded();
    let system = start(&api);

    system.clients.books.list(&book_query()).await.expect("books");
    let picker = system.clients.categories.picker().await.expect("picker");
    assert_eq!(picker.len(), 2);

    system
        .clients
        .categories
        .update("c1", CategoryForm::new("Science Fiction", "Space"))
        .await
        .expect("update category");

    system.clients.books.list(&book_query()).await.expect("books");
    system.clients.categories.picker().await.expect("picker");
    assert_eq!(api.list_calls(Resource::Books), 2);
    assert_eq!(api.list_calls(Resource::Categories), 2);

    system.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn test_returning_a_book_stamps_return_date() {
    let api = FakeApi::new();
    api.seed(Resource::Transactions, vec![transaction("t1", "borrowed")]);
    let system = start(&api);

    let updated = system
        .clients
        .transactions
        .set_status("t1", TransactionStatus::Returned)
        .await
        .expect("set status");
    assert_eq!(updated.status, TransactionStatus::Returned);
    assert!(updated.return_date.is_some());

    system
        .clients
        .transactions
        .set_status("t1", TransactionStatus::Borrowed)
        .await
        .expect("set status");
    let payload = api.last_payload().expect("payload");
    assert!(payload["returnDate"].is_null());
    assert_eq!(payload["status"], "borrowed");

    system.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn test_user_update_refreshes_transactions() {
    let api = FakeApi::new();
    api.seed(Resource::Transactions, vec![transaction("t1", "overdue")]);
    api.seed(
        Resource::Users,
        vec![serde_json::to_value(common::profile(
            library_admin::model::Role::User,
            AccountStatus::Active,
        ))
        .expect("profile json")],
    );
    let system = start(&api);
    let query = ListQuery::new(&library_admin::model::BorrowTransaction::defaults());

    system.clients.transactions.list(&query).await.expect("transactions");
    let user = system
        .clients
        .users
        .update("u1", UserUpdate::status(AccountStatus::Banned))
        .await
        .expect("ban user");
    assert!(user.is_banned());

    system.clients.transactions.list(&query).await.expect("transactions");
    assert_eq!(api.list_calls(Resource::Transactions), 2);

    system.shutdown().await.expect("shutdown");
}

/// An open screen refetches on its own when a mutation touches its resource.
#[tokio::test]
async fn test_open_screen_follows_mutations() {
    let api = seeded();
    let system = start(&api);

    let screen = system.list_screen::<Book>();
    let state = screen.wait_until_settled().await.expect("settled");
    assert_eq!(state.render().rows.len(), 3);

    system.clients.books.delete("b3").await.expect("delete");

    let mut states = screen.subscribe();
    let state = states
        .wait_for(|s| s.is_settled() && s.result().is_some_and(|r| r.total == 2))
        .await
        .expect("refetched")
        .clone();
    assert!(state.render().rows.iter().all(|b| b.id != "b3"));

    drop(screen);
    system.shutdown().await.expect("shutdown");
}
