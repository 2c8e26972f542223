//! Port abstraction for book and page persistence adapters.
//!
//! Pages never outlive their book: all page mutations run through this port
//! so the adapter can commit the page write and the owning book's
//! `updated_at` advance as one atomic unit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::book::{Book, BookChanges, BookDraft};
use crate::domain::error::Error;
use crate::domain::page::{Page, PageChanges, PageDraft};

use super::macros::define_port_error;

define_port_error! {
    /// Persistence errors raised by book repository adapters.
    pub enum BookPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "book repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "book repository query failed: {message}",
        /// No book matches the supplied identifier.
        BookNotFound => "Book not found.",
        /// No page matches the supplied identifier.
        PageNotFound => "Page not found.",
        /// Another page of the same book already holds the number.
        DuplicatePageNumber => "A page with this number already exists.",
    }
}

impl From<BookPersistenceError> for Error {
    fn from(error: BookPersistenceError) -> Self {
        match error {
            BookPersistenceError::Connection { message } => Self::service_unavailable(message),
            BookPersistenceError::Query { message } => Self::internal(message),
            BookPersistenceError::BookNotFound | BookPersistenceError::PageNotFound => {
                Self::not_found(error.to_string())
            }
            BookPersistenceError::DuplicatePageNumber => {
                Self::conflict(error.to_string()).with_details(json!({ "field": "number" }))
            }
        }
    }
}

/// Storage port for books and their ordered pages.
///
/// Mutating operations accept `now` so one timestamp covers the whole
/// transaction and tests can pin the clock.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Persist a new book with `created_at = updated_at = now`.
    async fn create_book(
        &self,
        draft: BookDraft,
        now: DateTime<Utc>,
    ) -> Result<Book, BookPersistenceError>;

    /// Apply a metadata change set, advancing `updated_at` on success.
    async fn update_book(
        &self,
        uuid: Uuid,
        changes: BookChanges,
        now: DateTime<Utc>,
    ) -> Result<Book, BookPersistenceError>;

    /// Delete a book and, by cascade, all of its pages.
    async fn delete_book(&self, uuid: Uuid) -> Result<(), BookPersistenceError>;

    /// Fetch a book by its external identifier.
    async fn find_book(&self, uuid: Uuid) -> Result<Book, BookPersistenceError>;

    /// List books ordered by `created_at` descending, with the total count.
    async fn list_books(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Book>, u64), BookPersistenceError>;

    /// Create a page and touch the owning book in the same transaction.
    ///
    /// Fails with [`BookPersistenceError::BookNotFound`] when `book_uuid`
    /// does not resolve and [`BookPersistenceError::DuplicatePageNumber`]
    /// when the `(book, number)` pair already exists.
    async fn create_page(
        &self,
        book_uuid: Uuid,
        draft: PageDraft,
        now: DateTime<Utc>,
    ) -> Result<Page, BookPersistenceError>;

    /// Apply a page change set and touch the owning book atomically.
    ///
    /// A number change re-validates uniqueness against the book's other
    /// pages, excluding the page being updated so no-op updates succeed.
    async fn update_page(
        &self,
        uuid: Uuid,
        changes: PageChanges,
        now: DateTime<Utc>,
    ) -> Result<Page, BookPersistenceError>;

    /// Delete a page and touch the owning book atomically.
    async fn delete_page(&self, uuid: Uuid, now: DateTime<Utc>)
        -> Result<(), BookPersistenceError>;

    /// Fetch a page by its external identifier.
    async fn find_page(&self, uuid: Uuid) -> Result<Page, BookPersistenceError>;

    /// List a book's pages ordered by number ascending, with the total count.
    ///
    /// This is filter semantics: an unresolved `book_uuid` yields an empty
    /// result, not an error, deliberately asymmetric with the mutation paths.
    async fn list_pages(
        &self,
        book_uuid: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Page>, u64), BookPersistenceError>;
}
