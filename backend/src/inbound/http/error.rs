//! HTTP mapping for domain errors.
//!
//! Handlers return [`Error`] directly; this module decides the status code
//! and response body. Internal errors are logged with their real message and
//! redacted in the body.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::domain::{Error, ErrorCode};

/// Result alias used by HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Status code for a domain error code.
///
/// Uniqueness conflicts deliberately map to `400 Bad Request` rather than
/// `409`: clients treat them as validation failures of the submitted payload.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::Conflict => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self.code() {
            ErrorCode::InternalError => {
                tracing::error!(message = self.message(), "internal error");
                Error::internal("An internal error occurred.")
            }
            ErrorCode::ServiceUnavailable => {
                tracing::warn!(message = self.message(), "backing service unavailable");
                Error::service_unavailable("Service temporarily unavailable.")
            }
            _ => self.clone(),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<pagination::PageError> for Error {
    fn from(error: pagination::PageError) -> Self {
        // Page-number pagination treats a bad page like a missing resource.
        Self::not_found(error.to_string())
    }
}
