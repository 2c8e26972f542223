//! Book collection and detail endpoints.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use pagination::{PageNumber as ListPage, Pager, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    authorize, AccessMethod, AuthorName, Book, BookChanges, BookDraft, BookValidationError, Error,
    Title,
};

use super::auth::AuthContext;
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{invalid_field, missing_field, parse_uuid_path, request_url};

const PAGE_SIZE: u32 = 10;
const PAGER: Pager = match Pager::new(PAGE_SIZE) {
    Some(pager) => pager,
    None => panic!("page size must be non-zero"),
};

const NOT_FOUND: &str = "Book not found.";

/// Book representation returned by every endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDto {
    /// Opaque identifier used in URLs.
    pub uuid: Uuid,
    /// Title.
    #[schema(value_type = String)]
    pub title: Title,
    /// Author.
    #[schema(value_type = String)]
    pub author: AuthorName,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last modification of the book or any of its pages.
    pub updated_at: DateTime<Utc>,
}

impl From<&Book> for BookDto {
    fn from(book: &Book) -> Self {
        Self {
            uuid: book.uuid(),
            title: book.title().clone(),
            author: book.author().clone(),
            created_at: book.created_at(),
            updated_at: book.updated_at(),
        }
    }
}

fn title_field(raw: String) -> Result<Title, Error> {
    Title::new(raw).map_err(|err| field_error("title", &err))
}

fn author_field(raw: String) -> Result<AuthorName, Error> {
    AuthorName::new(raw).map_err(|err| field_error("author", &err))
}

fn field_error(field: &str, err: &BookValidationError) -> Error {
    match err {
        BookValidationError::EmptyTitle | BookValidationError::EmptyAuthor => {
            invalid_field(field, "This field may not be blank.")
        }
        BookValidationError::TitleTooLong { max } | BookValidationError::AuthorTooLong { max } => {
            invalid_field(
                field,
                format!("Ensure this field has no more than {max} characters."),
            )
        }
        BookValidationError::UpdatedBeforeCreated => Error::internal(err.to_string()),
    }
}

/// Payload for creating a book.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    /// Title, required, at most 128 characters.
    pub title: Option<String>,
    /// Author, required, at most 128 characters.
    pub author: Option<String>,
}

impl CreateBookRequest {
    fn into_draft(self) -> Result<BookDraft, Error> {
        let title = title_field(self.title.ok_or_else(|| missing_field("title"))?)?;
        let author = author_field(self.author.ok_or_else(|| missing_field("author"))?)?;
        Ok(BookDraft { title, author })
    }
}

/// Payload for partially updating a book.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookRequest {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement author.
    pub author: Option<String>,
}

impl UpdateBookRequest {
    fn into_changes(self) -> Result<BookChanges, Error> {
        Ok(BookChanges {
            title: self.title.map(title_field).transpose()?,
            author: self.author.map(author_field).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
}

/// List books, newest first, ten per page.
#[utoipa::path(
    get,
    path = "/api/v1/books",
    params(("page" = Option<u32>, Query, description = "1-based page number")),
    responses(
        (status = 200, description = "Paginated books, newest first", body = Paginated<BookDto>),
        (status = 404, description = "Page out of range", body = Error)
    )
)]
pub async fn list(
    req: HttpRequest,
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Paginated<BookDto>>> {
    authorize(auth.actor(), AccessMethod::Read)?;
    let page = ListPage::from_query(query.into_inner().page.as_deref())?;
    let offset = u64::from(page.get() - 1) * u64::from(PAGER.page_size());
    let (books, count) = state
        .books
        .list_books(u64::from(PAGER.page_size()), offset)
        .await?;
    let slice = PAGER.slice(page, count)?;
    let url = request_url(&req)?;
    let results = books.iter().map(BookDto::from).collect();
    Ok(web::Json(slice.envelope(&url, results)))
}

/// Create a book. Editors only.
#[utoipa::path(
    post,
    path = "/api/v1/books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = BookDto),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not authenticated", body = Error),
        (status = 403, description = "Not an editor", body = Error)
    )
)]
pub async fn create(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateBookRequest>,
) -> ApiResult<HttpResponse> {
    authorize(auth.actor(), AccessMethod::Write)?;
    let draft = payload.into_inner().into_draft()?;
    let book = state.books.create_book(draft, Utc::now()).await?;
    Ok(HttpResponse::Created().json(BookDto::from(&book)))
}

/// Fetch a single book.
#[utoipa::path(
    get,
    path = "/api/v1/books/{uuid}",
    params(("uuid" = Uuid, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "The book", body = BookDto),
        (status = 404, description = "No such book", body = Error)
    )
)]
pub async fn retrieve(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookDto>> {
    authorize(auth.actor(), AccessMethod::Read)?;
    let uuid = parse_uuid_path(&path.into_inner(), NOT_FOUND)?;
    let book = state.books.find_book(uuid).await?;
    Ok(web::Json(BookDto::from(&book)))
}

/// Partially update a book's metadata. Editors only.
#[utoipa::path(
    patch,
    path = "/api/v1/books/{uuid}",
    params(("uuid" = Uuid, Path, description = "Book identifier")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Updated book", body = BookDto),
        (status = 400, description = "Validation failed", body = Error),
        (status = 404, description = "No such book", body = Error)
    )
)]
pub async fn update(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
    payload: web::Json<UpdateBookRequest>,
) -> ApiResult<web::Json<BookDto>> {
    authorize(auth.actor(), AccessMethod::Write)?;
    let uuid = parse_uuid_path(&path.into_inner(), NOT_FOUND)?;
    let changes = payload.into_inner().into_changes()?;
    let book = state.books.update_book(uuid, changes, Utc::now()).await?;
    Ok(web::Json(BookDto::from(&book)))
}

/// Delete a book and all of its pages. Editors only.
#[utoipa::path(
    delete,
    path = "/api/v1/books/{uuid}",
    params(("uuid" = Uuid, Path, description = "Book identifier")),
    responses(
        (status = 204, description = "Book and pages deleted"),
        (status = 404, description = "No such book", body = Error)
    )
)]
pub async fn remove(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    authorize(auth.actor(), AccessMethod::Write)?;
    let uuid = parse_uuid_path(&path.into_inner(), NOT_FOUND)?;
    state.books.delete_book(uuid).await?;
    Ok(HttpResponse::NoContent().finish())
}
