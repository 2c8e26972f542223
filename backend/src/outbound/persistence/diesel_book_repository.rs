//! Diesel-backed implementation of the [`BookRepository`] port.
//!
//! Page mutations and the owning book's `updated_at` advance commit inside
//! one transaction, so a reader can never observe a page write without the
//! matching book timestamp.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{BookPersistenceError, BookRepository};
use crate::domain::{Book, BookChanges, BookDraft, Page, PageChanges, PageDraft};

use super::error_mapping::is_unique_violation;
use super::models::{BookChangesetRow, BookRow, NewBookRow, NewPageRow, PageChangesetRow, PageRow};
use super::pool::DbPool;
use super::schema::{books, pages};

/// Stores books and pages in PostgreSQL.
#[derive(Clone)]
pub struct DieselBookRepository {
    pool: DbPool,
}

/// Error carrier used inside transactions: keeps Diesel failures intact so
/// the transaction machinery can roll back, then classifies them on exit.
#[derive(Debug)]
enum TxError {
    Port(BookPersistenceError),
    Diesel(diesel::result::Error),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<BookPersistenceError> for TxError {
    fn from(error: BookPersistenceError) -> Self {
        Self::Port(error)
    }
}

fn finish<T>(result: Result<T, TxError>) -> Result<T, BookPersistenceError> {
    result.map_err(|error| match error {
        TxError::Port(port) => port,
        TxError::Diesel(err) if is_unique_violation(&err) => {
            BookPersistenceError::duplicate_page_number()
        }
        TxError::Diesel(err) => BookPersistenceError::query(err.to_string()),
    })
}

fn map_query_error(error: diesel::result::Error) -> BookPersistenceError {
    BookPersistenceError::query(error.to_string())
}

impl DieselBookRepository {
    /// Create a repository backed by the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, diesel_async::AsyncPgConnection>,
        BookPersistenceError,
    > {
        self.pool
            .get()
            .await
            .map_err(|err| BookPersistenceError::connection(err.to_string()))
    }
}

#[async_trait]
impl BookRepository for DieselBookRepository {
    async fn create_book(
        &self,
        draft: BookDraft,
        now: DateTime<Utc>,
    ) -> Result<Book, BookPersistenceError> {
        let mut conn = self.conn().await?;
        let row = NewBookRow {
            uuid: Uuid::new_v4(),
            title: draft.title.as_ref(),
            author: draft.author.as_ref(),
            created_at: now,
            updated_at: now,
        };
        let inserted: BookRow = diesel::insert_into(books::table)
            .values(&row)
            .returning(BookRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;
        Book::try_from(inserted).map_err(BookPersistenceError::query)
    }

    async fn update_book(
        &self,
        uuid: Uuid,
        changes: BookChanges,
        now: DateTime<Utc>,
    ) -> Result<Book, BookPersistenceError> {
        if changes.is_empty() {
            return self.find_book(uuid).await;
        }
        let mut conn = self.conn().await?;
        let changeset = BookChangesetRow {
            title: changes.title.as_ref().map(AsRef::as_ref),
            author: changes.author.as_ref().map(AsRef::as_ref),
            updated_at: now,
        };
        let updated: Option<BookRow> = diesel::update(books::table.filter(books::uuid.eq(uuid)))
            .set(&changeset)
            .returning(BookRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        let row = updated.ok_or_else(BookPersistenceError::book_not_found)?;
        Book::try_from(row).map_err(BookPersistenceError::query)
    }

    async fn delete_book(&self, uuid: Uuid) -> Result<(), BookPersistenceError> {
        let mut conn = self.conn().await?;
        // Pages go with the book via the foreign key cascade.
        let affected = diesel::delete(books::table.filter(books::uuid.eq(uuid)))
            .execute(&mut conn)
            .await
            .map_err(map_query_error)?;
        if affected == 0 {
            return Err(BookPersistenceError::book_not_found());
        }
        Ok(())
    }

    async fn find_book(&self, uuid: Uuid) -> Result<Book, BookPersistenceError> {
        let mut conn = self.conn().await?;
        let row: Option<BookRow> = books::table
            .filter(books::uuid.eq(uuid))
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        let row = row.ok_or_else(BookPersistenceError::book_not_found)?;
        Book::try_from(row).map_err(BookPersistenceError::query)
    }

    async fn list_books(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Book>, u64), BookPersistenceError> {
        let mut conn = self.conn().await?;
        let total: i64 = books::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;
        let rows: Vec<BookRow> = books::table
            .order(books::created_at.desc())
            // Newest-first needs a stable tie-break when timestamps collide.
            .then_order_by(books::id.desc())
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .offset(i64::try_from(offset).unwrap_or(i64::MAX))
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;
        let books = rows
            .into_iter()
            .map(|row| Book::try_from(row).map_err(BookPersistenceError::query))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((books, u64::try_from(total).unwrap_or_default()))
    }

    async fn create_page(
        &self,
        book_uuid: Uuid,
        draft: PageDraft,
        now: DateTime<Utc>,
    ) -> Result<Page, BookPersistenceError> {
        let mut conn = self.conn().await?;
        let result = conn
            .transaction::<Page, TxError, _>(|conn| {
                async move {
                    let book_id: Option<i32> = books::table
                        .filter(books::uuid.eq(book_uuid))
                        .select(books::id)
                        .first(conn)
                        .await
                        .optional()?;
                    let book_id =
                        book_id.ok_or_else(|| TxError::from(BookPersistenceError::book_not_found()))?;
                    let page = Page::new(book_uuid, draft);
                    let row = NewPageRow {
                        uuid: page.uuid(),
                        book_id,
                        number: page.number().get(),
                        content: page.content().as_ref(),
                    };
                    diesel::insert_into(pages::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    diesel::update(books::table.find(book_id))
                        .set(books::updated_at.eq(now))
                        .execute(conn)
                        .await?;
                    Ok(page)
                }
                .scope_boxed()
            })
            .await;
        finish(result)
    }

    async fn update_page(
        &self,
        uuid: Uuid,
        changes: PageChanges,
        now: DateTime<Utc>,
    ) -> Result<Page, BookPersistenceError> {
        let mut conn = self.conn().await?;
        let result = conn
            .transaction::<Page, TxError, _>(|conn| {
                async move {
                    let found: Option<(PageRow, Uuid)> = pages::table
                        .inner_join(books::table)
                        .filter(pages::uuid.eq(uuid))
                        .select((PageRow::as_select(), books::uuid))
                        .first(conn)
                        .await
                        .optional()?;
                    let (row, book_uuid) = found
                        .ok_or_else(|| TxError::from(BookPersistenceError::page_not_found()))?;
                    if changes.is_empty() {
                        return row
                            .into_domain(book_uuid)
                            .map_err(|msg| TxError::from(BookPersistenceError::query(msg)));
                    }
                    let changeset = PageChangesetRow {
                        number: changes.number.map(crate::domain::PageNumber::get),
                        content: changes.content.as_ref().map(AsRef::as_ref),
                    };
                    // The unique index excludes the row being updated by
                    // construction, so writing back an unchanged number is
                    // not a violation.
                    let updated: PageRow = diesel::update(pages::table.find(row.id))
                        .set(&changeset)
                        .returning(PageRow::as_returning())
                        .get_result(conn)
                        .await?;
                    diesel::update(books::table.find(row.book_id))
                        .set(books::updated_at.eq(now))
                        .execute(conn)
                        .await?;
                    updated
                        .into_domain(book_uuid)
                        .map_err(|msg| TxError::from(BookPersistenceError::query(msg)))
                }
                .scope_boxed()
            })
            .await;
        finish(result)
    }

    async fn delete_page(
        &self,
        uuid: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), BookPersistenceError> {
        let mut conn = self.conn().await?;
        let result = conn
            .transaction::<(), TxError, _>(|conn| {
                async move {
                    let found: Option<(i32, i32)> = pages::table
                        .filter(pages::uuid.eq(uuid))
                        .select((pages::id, pages::book_id))
                        .first(conn)
                        .await
                        .optional()?;
                    let (page_id, book_id) = found
                        .ok_or_else(|| TxError::from(BookPersistenceError::page_not_found()))?;
                    diesel::delete(pages::table.find(page_id))
                        .execute(conn)
                        .await?;
                    diesel::update(books::table.find(book_id))
                        .set(books::updated_at.eq(now))
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;
        finish(result)
    }

    async fn find_page(&self, uuid: Uuid) -> Result<Page, BookPersistenceError> {
        let mut conn = self.conn().await?;
        let found: Option<(PageRow, Uuid)> = pages::table
            .inner_join(books::table)
            .filter(pages::uuid.eq(uuid))
            .select((PageRow::as_select(), books::uuid))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;
        let (row, book_uuid) = found.ok_or_else(BookPersistenceError::page_not_found)?;
        row.into_domain(book_uuid)
            .map_err(BookPersistenceError::query)
    }

    async fn list_pages(
        &self,
        book_uuid: Uuid,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<Page>, u64), BookPersistenceError> {
        let mut conn = self.conn().await?;
        let total: i64 = pages::table
            .inner_join(books::table)
            .filter(books::uuid.eq(book_uuid))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;
        let rows: Vec<PageRow> = pages::table
            .inner_join(books::table)
            .filter(books::uuid.eq(book_uuid))
            .order(pages::number.asc())
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .offset(i64::try_from(offset).unwrap_or(i64::MAX))
            .select(PageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;
        let pages = rows
            .into_iter()
            .map(|row| {
                row.into_domain(book_uuid)
                    .map_err(BookPersistenceError::query)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((pages, u64::try_from(total).unwrap_or_default()))
    }
}
