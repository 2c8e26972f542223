//! PostgreSQL integration tests for the Diesel repositories.
//!
//! These run only when `TEST_DATABASE_URL` points at a disposable database;
//! without it each test returns early so the suite stays green on machines
//! without PostgreSQL. Migrations are applied on first connection.

use backend::domain::ports::{BookPersistenceError, BookRepository, UserPersistenceError, UserRepository};
use backend::domain::{
    AuthorName, BookDraft, EmailAddress, NewUser, PageContent, PageDraft, PageNumber, Title,
    UserChanges, UserName,
};
use backend::outbound::persistence::migrations;
use backend::outbound::{DbPool, DieselBookRepository, DieselUserRepository, PoolConfig};
use chrono::{Duration, Utc};
use uuid::Uuid;

async fn repositories() -> Option<(DieselBookRepository, DieselUserRepository)> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let migration_url = url.clone();
    tokio::task::spawn_blocking(move || migrations::run_pending_migrations(&migration_url))
        .await
        .expect("migration task")
        .expect("migrations apply");
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(2))
        .await
        .expect("pool builds");
    Some((
        DieselBookRepository::new(pool.clone()),
        DieselUserRepository::new(pool),
    ))
}

fn book_draft(title: &str) -> BookDraft {
    BookDraft {
        title: Title::new(title).expect("title"),
        author: AuthorName::new("Integration Author").expect("author"),
    }
}

fn page_draft(number: i64, content: &str) -> PageDraft {
    PageDraft {
        number: PageNumber::new(number).expect("number"),
        content: PageContent::new(content).expect("content"),
    }
}

fn unique_email() -> EmailAddress {
    EmailAddress::new(format!("it-{}@example.com", Uuid::new_v4())).expect("email")
}

#[actix_rt::test]
async fn page_mutations_touch_the_owning_book() {
    let Some((books, _)) = repositories().await else {
        return;
    };
    let created = Utc::now();
    let book = books
        .create_book(book_draft("Propagation Book"), created)
        .await
        .expect("book created");
    assert_eq!(book.created_at(), book.updated_at());

    let later = created + Duration::seconds(2);
    let page = books
        .create_page(book.uuid(), page_draft(1, "first"), later)
        .await
        .expect("page created");
    let refreshed = books.find_book(book.uuid()).await.expect("book exists");
    assert_eq!(refreshed.updated_at(), later);
    assert_eq!(refreshed.created_at(), created);

    let even_later = later + Duration::seconds(2);
    books
        .delete_page(page.uuid(), even_later)
        .await
        .expect("page deleted");
    let refreshed = books.find_book(book.uuid()).await.expect("book exists");
    assert_eq!(refreshed.updated_at(), even_later);

    books.delete_book(book.uuid()).await.expect("book deleted");
}

#[actix_rt::test]
async fn duplicate_page_numbers_are_rejected_by_the_database() {
    let Some((books, _)) = repositories().await else {
        return;
    };
    let now = Utc::now();
    let book = books
        .create_book(book_draft("Uniqueness Book"), now)
        .await
        .expect("book created");
    books
        .create_page(book.uuid(), page_draft(1, "first"), now)
        .await
        .expect("page created");
    let err = books
        .create_page(book.uuid(), page_draft(1, "duplicate"), now)
        .await
        .expect_err("duplicate rejected");
    assert_eq!(err, BookPersistenceError::duplicate_page_number());

    // The same number on another book is fine.
    let other = books
        .create_book(book_draft("Other Book"), now)
        .await
        .expect("book created");
    books
        .create_page(other.uuid(), page_draft(1, "first elsewhere"), now)
        .await
        .expect("no cross-book conflict");

    books.delete_book(book.uuid()).await.expect("cleanup");
    books.delete_book(other.uuid()).await.expect("cleanup");
}

#[actix_rt::test]
async fn updating_a_page_to_its_own_number_is_not_a_conflict() {
    let Some((books, _)) = repositories().await else {
        return;
    };
    let now = Utc::now();
    let book = books
        .create_book(book_draft("Self Update Book"), now)
        .await
        .expect("book created");
    let page = books
        .create_page(book.uuid(), page_draft(3, "third"), now)
        .await
        .expect("page created");
    let updated = books
        .update_page(
            page.uuid(),
            backend::domain::PageChanges {
                number: Some(PageNumber::new(3).expect("number")),
                content: Some(PageContent::new("rewritten").expect("content")),
            },
            now + Duration::seconds(1),
        )
        .await
        .expect("self-number update succeeds");
    assert_eq!(updated.content().as_ref(), "rewritten");

    books.delete_book(book.uuid()).await.expect("cleanup");
}

#[actix_rt::test]
async fn deleting_a_book_cascades_to_its_pages() {
    let Some((books, _)) = repositories().await else {
        return;
    };
    let now = Utc::now();
    let book = books
        .create_book(book_draft("Cascade Book"), now)
        .await
        .expect("book created");
    let page = books
        .create_page(book.uuid(), page_draft(1, "first"), now)
        .await
        .expect("page created");
    books.delete_book(book.uuid()).await.expect("book deleted");

    let err = books.find_page(page.uuid()).await.expect_err("page gone");
    assert_eq!(err, BookPersistenceError::page_not_found());
    let (pages, count) = books
        .list_pages(book.uuid(), 15, 0)
        .await
        .expect("empty listing");
    assert!(pages.is_empty());
    assert_eq!(count, 0);
}

#[actix_rt::test]
async fn duplicate_emails_are_rejected_and_updates_apply() {
    let Some((_, users)) = repositories().await else {
        return;
    };
    let email = unique_email();
    let draft = NewUser::reader(
        email.clone(),
        UserName::new("Integration User").expect("name"),
        "$argon2id$integration".to_owned(),
    );
    let user = users.create(draft.clone()).await.expect("user created");

    let err = users.create(draft).await.expect_err("duplicate email");
    assert_eq!(err, UserPersistenceError::duplicate_email());

    let renamed = users
        .update(
            user.id(),
            UserChanges {
                email: None,
                name: Some(UserName::new("Renamed User").expect("name")),
                password_hash: None,
            },
        )
        .await
        .expect("update applies");
    assert_eq!(renamed.name().as_ref(), "Renamed User");

    let found = users
        .find_by_email(&email)
        .await
        .expect("lookup succeeds")
        .expect("user present");
    assert_eq!(found.id(), user.id());

    users.delete(user.id()).await.expect("cleanup");
    assert_eq!(
        users.delete(user.id()).await.expect_err("already gone"),
        UserPersistenceError::not_found()
    );
}
