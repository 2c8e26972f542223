//! Liveness and readiness probes.

use actix_web::{web, HttpResponse};
use serde_json::json;

use super::error::ApiResult;
use super::state::HttpState;

/// Liveness: the process is up and serving requests.
#[utoipa::path(
    get,
    path = "/healthz/live",
    responses((status = 200, description = "Process is alive"))
)]
#[expect(clippy::unused_async, reason = "route handlers must be async")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Readiness: the backing store answers a trivial query.
#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Dependencies are reachable"),
        (status = 503, description = "Backing store is unavailable")
    )
)]
pub async fn ready(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    state.books.list_books(1, 0).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}
