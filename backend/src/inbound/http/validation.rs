//! Request validation helpers shared across handlers.
//!
//! Error messages deliberately mirror the established API contract
//! (`"This field is required."` and friends) so existing clients keep
//! working; helpers attach the offending field as structured details.

use actix_web::error::JsonPayloadError;
use actix_web::HttpRequest;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::domain::Error;

/// `400` for a missing required field.
pub fn missing_field(field: &str) -> Error {
    Error::invalid_request("This field is required.").with_details(json!({ "field": field }))
}

/// `400` for a field that failed validation.
pub fn invalid_field(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field }))
}

/// Parse a UUID path segment.
///
/// Lookup semantics: an identifier that is not even a UUID cannot name a
/// resource, so the caller's not-found message is returned rather than a
/// validation error.
pub fn parse_uuid_path(raw: &str, not_found_message: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|_| Error::not_found(not_found_message))
}

/// Parse a UUID query parameter, failing as a validation error.
pub fn parse_uuid_query(field: &str, raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|_| invalid_field(field, "Enter a valid UUID."))
}

/// Reconstruct the absolute request URL for pagination links.
pub fn request_url(req: &HttpRequest) -> Result<Url, Error> {
    let info = req.connection_info();
    let raw = format!("{}://{}{}", info.scheme(), info.host(), req.uri());
    Url::parse(&raw).map_err(|_| Error::internal(format!("unparsable request url: {raw}")))
}

/// Map malformed JSON bodies into the standard error envelope.
///
/// Registered through [`actix_web::web::JsonConfig`] so deserialisation
/// failures (including newtype validation) surface as `400` with a JSON body
/// instead of actix's plain-text default.
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(error.to_string()).into()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;

    #[test]
    fn missing_field_names_the_field() {
        let error = missing_field("book_uuid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "This field is required.");
        assert_eq!(
            error.details().and_then(|d| d.get("field")),
            Some(&json!("book_uuid"))
        );
    }

    #[test]
    fn bad_path_uuid_reads_as_missing_resource() {
        let error = parse_uuid_path("not-a-uuid", "Book not found.").expect_err("invalid uuid");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "Book not found.");
    }

    #[test]
    fn bad_query_uuid_is_a_validation_error() {
        let error = parse_uuid_query("book_uuid", "zzz").expect_err("invalid uuid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "Enter a valid UUID.");
    }

    #[test]
    fn request_url_preserves_query() {
        let req = TestRequest::get()
            .uri("/api/v1/pages?book_uuid=abc&page=2")
            .to_http_request();
        let url = request_url(&req).expect("url");
        assert_eq!(url.path(), "/api/v1/pages");
        assert_eq!(url.query(), Some("book_uuid=abc&page=2"));
    }
}
