//! Page collection and detail endpoints.
//!
//! The collection is always scoped to one book via the mandatory
//! `book_uuid` query parameter. Listing an unknown book yields an empty
//! result (filter semantics) while mutating one yields `404` (lookup
//! semantics); the asymmetry is part of the API contract.

use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use pagination::{PageNumber as ListPage, Pager, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    authorize, AccessMethod, Error, Page, PageChanges, PageContent, PageDraft, PageNumber,
    PageValidationError,
};

use super::auth::AuthContext;
use super::error::ApiResult;
use super::state::HttpState;
use super::validation::{
    invalid_field, missing_field, parse_uuid_path, parse_uuid_query, request_url,
};

const PAGE_SIZE: u32 = 15;
const PAGER: Pager = match Pager::new(PAGE_SIZE) {
    Some(pager) => pager,
    None => panic!("page size must be non-zero"),
};

const NOT_FOUND: &str = "Page not found.";

/// Page representation in the collection endpoints, which span books.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageDto {
    /// Opaque identifier used in URLs.
    pub uuid: Uuid,
    /// Owning book, referenced by uuid.
    pub book: Uuid,
    /// 1-based position within the book.
    #[schema(value_type = i64)]
    pub number: PageNumber,
    /// Page text.
    #[schema(value_type = String)]
    pub content: PageContent,
}

impl From<&Page> for PageDto {
    fn from(page: &Page) -> Self {
        Self {
            uuid: page.uuid(),
            book: page.book_uuid(),
            number: page.number(),
            content: page.content().clone(),
        }
    }
}

/// Page representation in the detail endpoints, where the book is implied.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageDetailDto {
    /// Opaque identifier used in URLs.
    pub uuid: Uuid,
    /// 1-based position within the book.
    #[schema(value_type = i64)]
    pub number: PageNumber,
    /// Page text.
    #[schema(value_type = String)]
    pub content: PageContent,
}

impl From<&Page> for PageDetailDto {
    fn from(page: &Page) -> Self {
        Self {
            uuid: page.uuid(),
            number: page.number(),
            content: page.content().clone(),
        }
    }
}

fn number_field(raw: i64) -> Result<PageNumber, Error> {
    PageNumber::new(raw)
        .map_err(|_| invalid_field("number", "Ensure this value is greater than or equal to 1."))
}

fn content_field(raw: String) -> Result<PageContent, Error> {
    PageContent::new(raw).map_err(|err| match err {
        PageValidationError::EmptyContent => {
            invalid_field("content", "This field may not be blank.")
        }
        PageValidationError::ContentTooLong { max } => invalid_field(
            "content",
            format!("Ensure this field has no more than {max} characters."),
        ),
        PageValidationError::InvalidNumber => Error::internal(err.to_string()),
    })
}

/// Payload for creating a page.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePageRequest {
    /// Owning book's uuid, required.
    pub book: Option<String>,
    /// 1-based page number, required, unique within the book.
    pub number: Option<i64>,
    /// Page text, required, at most 2048 characters.
    pub content: Option<String>,
}

impl CreatePageRequest {
    fn into_parts(self) -> Result<(Uuid, PageDraft), Error> {
        let raw_uuid = self.book.ok_or_else(|| missing_field("book"))?;
        let book_uuid = parse_uuid_query("book", &raw_uuid)?;
        let number = number_field(self.number.ok_or_else(|| missing_field("number"))?)?;
        let content = content_field(self.content.ok_or_else(|| missing_field("content"))?)?;
        Ok((book_uuid, PageDraft { number, content }))
    }
}

/// Payload for partially updating a page.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePageRequest {
    /// Replacement number; re-checked for uniqueness within the book.
    pub number: Option<i64>,
    /// Replacement text.
    pub content: Option<String>,
}

impl UpdatePageRequest {
    fn into_changes(self) -> Result<PageChanges, Error> {
        Ok(PageChanges {
            number: self.number.map(number_field).transpose()?,
            content: self.content.map(content_field).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    book_uuid: Option<String>,
    page: Option<String>,
}

/// List one book's pages in reading order, fifteen per page.
#[utoipa::path(
    get,
    path = "/api/v1/pages",
    params(
        ("book_uuid" = Uuid, Query, description = "Book whose pages to list"),
        ("page" = Option<u32>, Query, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "Paginated pages ordered by number", body = Paginated<PageDto>),
        (status = 400, description = "Missing or malformed book_uuid", body = Error),
        (status = 404, description = "Page out of range", body = Error)
    )
)]
pub async fn list(
    req: HttpRequest,
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<Paginated<PageDto>>> {
    authorize(auth.actor(), AccessMethod::Read)?;
    let query = query.into_inner();
    let raw_uuid = query.book_uuid.ok_or_else(|| missing_field("book_uuid"))?;
    let book_uuid = parse_uuid_query("book_uuid", &raw_uuid)?;
    let page = ListPage::from_query(query.page.as_deref())?;
    let offset = u64::from(page.get() - 1) * u64::from(PAGER.page_size());
    let (pages, count) = state
        .books
        .list_pages(book_uuid, u64::from(PAGER.page_size()), offset)
        .await?;
    let slice = PAGER.slice(page, count)?;
    let url = request_url(&req)?;
    let results = pages.iter().map(PageDto::from).collect();
    Ok(web::Json(slice.envelope(&url, results)))
}

/// Add a page to a book. Editors only.
#[utoipa::path(
    post,
    path = "/api/v1/pages",
    request_body = CreatePageRequest,
    responses(
        (status = 201, description = "Page created", body = PageDto),
        (status = 400, description = "Validation failed or duplicate number", body = Error),
        (status = 404, description = "No such book", body = Error)
    )
)]
pub async fn create(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreatePageRequest>,
) -> ApiResult<HttpResponse> {
    authorize(auth.actor(), AccessMethod::Write)?;
    let (book_uuid, draft) = payload.into_inner().into_parts()?;
    let page = state
        .books
        .create_page(book_uuid, draft, Utc::now())
        .await?;
    Ok(HttpResponse::Created().json(PageDto::from(&page)))
}

/// Fetch a single page.
#[utoipa::path(
    get,
    path = "/api/v1/pages/{uuid}",
    params(("uuid" = Uuid, Path, description = "Page identifier")),
    responses(
        (status = 200, description = "The page", body = PageDetailDto),
        (status = 404, description = "No such page", body = Error)
    )
)]
pub async fn retrieve(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<PageDetailDto>> {
    authorize(auth.actor(), AccessMethod::Read)?;
    let uuid = parse_uuid_path(&path.into_inner(), NOT_FOUND)?;
    let page = state.books.find_page(uuid).await?;
    Ok(web::Json(PageDetailDto::from(&page)))
}

/// Partially update a page. Editors only.
#[utoipa::path(
    patch,
    path = "/api/v1/pages/{uuid}",
    params(("uuid" = Uuid, Path, description = "Page identifier")),
    request_body = UpdatePageRequest,
    responses(
        (status = 200, description = "Updated page", body = PageDetailDto),
        (status = 400, description = "Validation failed or duplicate number", body = Error),
        (status = 404, description = "No such page", body = Error)
    )
)]
pub async fn update(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
    payload: web::Json<UpdatePageRequest>,
) -> ApiResult<web::Json<PageDetailDto>> {
    authorize(auth.actor(), AccessMethod::Write)?;
    let uuid = parse_uuid_path(&path.into_inner(), NOT_FOUND)?;
    let changes = payload.into_inner().into_changes()?;
    let page = state.books.update_page(uuid, changes, Utc::now()).await?;
    Ok(web::Json(PageDetailDto::from(&page)))
}

/// Delete a page. Editors only.
#[utoipa::path(
    delete,
    path = "/api/v1/pages/{uuid}",
    params(("uuid" = Uuid, Path, description = "Page identifier")),
    responses(
        (status = 204, description = "Page deleted"),
        (status = 404, description = "No such page", body = Error)
    )
)]
pub async fn remove(
    state: web::Data<HttpState>,
    auth: AuthContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    authorize(auth.actor(), AccessMethod::Write)?;
    let uuid = parse_uuid_path(&path.into_inner(), NOT_FOUND)?;
    state.books.delete_page(uuid, Utc::now()).await?;
    Ok(HttpResponse::NoContent().finish())
}
