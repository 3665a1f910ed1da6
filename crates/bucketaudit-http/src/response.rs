//! JSON response building and error formatting.

use bucketaudit_model::AuditError;
use serde::Serialize;
use tracing::error;

use crate::body::AuditResponseBody;

/// Content type of every audit response.
pub const CONTENT_TYPE: &str = "application/json";

/// Header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Serialize an audit error into its JSON body.
///
/// ```json
/// { "code": "MissingParameter", "error": "Missing 'bucket' parameter. Example: /scan?bucket=target-bucket" }
/// ```
#[must_use]
pub fn error_to_json(error: &AuditError) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "code": error.code.as_str(),
        "error": error.message,
    }))
    .expect("JSON serialization of error cannot fail")
}

/// Convert an `AuditError` into a complete HTTP error response.
#[must_use]
pub fn error_to_response(error: &AuditError, request_id: &str) -> http::Response<AuditResponseBody> {
    http::Response::builder()
        .status(error.status_code)
        .header("content-type", CONTENT_TYPE)
        .header(REQUEST_ID_HEADER, request_id)
        .body(AuditResponseBody::from_json(error_to_json(error)))
        .expect("valid error response")
}

/// Build a 200 response carrying `value` as JSON.
///
/// A value that fails to serialize becomes a 500 error response.
#[must_use]
pub fn json_response<T: Serialize + ?Sized>(
    value: &T,
    request_id: &str,
) -> http::Response<AuditResponseBody> {
    match AuditResponseBody::json(value) {
        Ok(body) => http::Response::builder()
            .status(http::StatusCode::OK)
            .header("content-type", CONTENT_TYPE)
            .header(REQUEST_ID_HEADER, request_id)
            .body(body)
            .expect("valid JSON response"),
        Err(e) => {
            error!(request_id, error = %e, "failed to serialize response");
            error_to_response(
                &AuditError::internal_error(format!("Failed to serialize response: {e}")),
                request_id,
            )
        }
    }
}
