//! OpenAPI description of the HTTP interface.

use actix_web::web;
use pagination::Paginated;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::books::{BookDto, CreateBookRequest, UpdateBookRequest};
use crate::inbound::http::pages::{
    CreatePageRequest, PageDetailDto, PageDto, UpdatePageRequest,
};
use crate::inbound::http::users::{
    RegisterRequest, TokenRequest, TokenResponse, UpdateUserRequest, UserDto,
};

/// Registers the bearer scheme used by every write endpoint.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Top-level OpenAPI document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book catalogue API",
        description = "Books with ordered pages, token authentication, and role-gated writes."
    ),
    paths(
        crate::inbound::http::books::list,
        crate::inbound::http::books::create,
        crate::inbound::http::books::retrieve,
        crate::inbound::http::books::update,
        crate::inbound::http::books::remove,
        crate::inbound::http::pages::list,
        crate::inbound::http::pages::create,
        crate::inbound::http::pages::retrieve,
        crate::inbound::http::pages::update,
        crate::inbound::http::pages::remove,
        crate::inbound::http::users::register,
        crate::inbound::http::users::me,
        crate::inbound::http::users::update_me,
        crate::inbound::http::users::delete_me,
        crate::inbound::http::users::token,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        BookDto,
        CreateBookRequest,
        UpdateBookRequest,
        Paginated<BookDto>,
        Paginated<PageDto>,
        PageDto,
        PageDetailDto,
        CreatePageRequest,
        UpdatePageRequest,
        UserDto,
        RegisterRequest,
        UpdateUserRequest,
        TokenRequest,
        TokenResponse,
        Error,
        ErrorCode,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Serve the generated document as JSON.
#[expect(clippy::unused_async, reason = "route handlers must be async")]
pub async fn openapi() -> web::Json<utoipa::openapi::OpenApi> {
    web::Json(ApiDoc::openapi())
}
