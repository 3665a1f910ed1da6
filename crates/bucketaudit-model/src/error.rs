//! Audit service error types.
//!
//! Errors are rendered as a JSON body of the form:
//!
//! ```json
//! { "code": "MissingParameter", "error": "Missing 'bucket' parameter." }
//! ```

use std::fmt;

/// Well-known error codes surfaced to HTTP callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum AuditErrorCode {
    /// A required query parameter is missing or empty.
    MissingParameter,
    /// A query parameter has an unusable value.
    InvalidParameter,
    /// No route matches the request path.
    RouteNotFound,
    /// The route exists but not for this method.
    MethodNotAllowed,
    /// The bucket does not exist or the caller cannot reach it.
    BucketNotAccessible,
    /// The storage provider failed unexpectedly.
    ProviderError,
    /// Anything else.
    #[default]
    InternalError,
}

impl AuditErrorCode {
    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingParameter => "MissingParameter",
            Self::InvalidParameter => "InvalidParameter",
            Self::RouteNotFound => "RouteNotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::BucketNotAccessible => "BucketNotAccessible",
            Self::ProviderError => "ProviderError",
            Self::InternalError => "InternalError",
        }
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::MissingParameter | Self::InvalidParameter => http::StatusCode::BAD_REQUEST,
            Self::RouteNotFound | Self::BucketNotAccessible => http::StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::ProviderError | Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AuditErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit service error response.
#[derive(Debug)]
pub struct AuditError {
    /// The error code.
    pub code: AuditErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuditError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for AuditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl AuditError {
    /// Create a new `AuditError` from an error code.
    #[must_use]
    pub fn new(code: AuditErrorCode) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: code.as_str().to_owned(),
            code,
            source: None,
        }
    }

    /// Create a new `AuditError` with a custom message.
    #[must_use]
    pub fn with_message(code: AuditErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // -- Convenience constructors --

    /// A required query parameter is missing.
    #[must_use]
    pub fn missing_parameter(name: &str, usage: &str) -> Self {
        Self::with_message(
            AuditErrorCode::MissingParameter,
            format!("Missing '{name}' parameter. Example: {usage}"),
        )
    }

    /// A query parameter is present but unusable.
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::with_message(AuditErrorCode::InvalidParameter, message)
    }

    /// No route for the path.
    #[must_use]
    pub fn route_not_found(path: &str) -> Self {
        Self::with_message(
            AuditErrorCode::RouteNotFound,
            format!("Route not found: {path}. Use /scan?bucket=<name> or /?buckets=<a,b>"),
        )
    }

    /// Unsupported method.
    #[must_use]
    pub fn method_not_allowed(method: &http::Method) -> Self {
        Self::with_message(
            AuditErrorCode::MethodNotAllowed,
            format!("Method {method} is not allowed; only GET is supported"),
        )
    }

    /// The bucket cannot be audited.
    #[must_use]
    pub fn bucket_not_accessible(bucket: &str) -> Self {
        Self::with_message(
            AuditErrorCode::BucketNotAccessible,
            format!("Bucket '{bucket}': Access Denied or Not Found"),
        )
    }

    /// Unexpected provider failure.
    #[must_use]
    pub fn provider_error(message: impl Into<String>) -> Self {
        Self::with_message(AuditErrorCode::ProviderError, message)
    }

    /// Internal failure.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(AuditErrorCode::InternalError, message)
    }
}
