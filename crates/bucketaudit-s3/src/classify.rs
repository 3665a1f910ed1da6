//! SDK error classification.
//!
//! S3 reports "this configuration does not exist" as an error with a
//! per-operation code. The probe needs to tell those apart from access
//! denials, missing buckets, wrong-region requests, and genuine failures.
//! `HeadBucket` responses carry no body, so the SDK fills in a code from
//! the HTTP status (`NotFound`, `Forbidden`, `MovedPermanently`) or leaves
//! it empty; both shapes are handled.

use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};

/// Error code S3 returns when no public access block is set.
pub const NO_PUBLIC_ACCESS_BLOCK: &str = "NoSuchPublicAccessBlockConfiguration";
/// Error code S3 returns when no default encryption is set.
pub const NO_ENCRYPTION: &str = "ServerSideEncryptionConfigurationNotFoundError";
/// Error code S3 returns when no bucket policy is attached.
pub const NO_BUCKET_POLICY: &str = "NoSuchBucketPolicy";
/// Error code S3 returns when no CORS rules are set.
pub const NO_CORS: &str = "NoSuchCORSConfiguration";

/// Response header naming the region a bucket lives in.
pub const BUCKET_REGION_HEADER: &str = "x-amz-bucket-region";

const MISSING_CODES: [&str; 2] = ["NoSuchBucket", "NotFound"];
const DENIED_CODES: [&str; 4] = [
    "AccessDenied",
    "AllAccessDisabled",
    "AccountProblem",
    "Forbidden",
];
const WRONG_REGION_CODES: [&str; 5] = [
    "PermanentRedirect",
    "TemporaryRedirect",
    "MovedPermanently",
    "AuthorizationHeaderMalformed",
    "IllegalLocationConstraintException",
];

/// How a failed provider call should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The requested configuration does not exist.
    NotConfigured,
    /// The caller may not perform the call.
    Denied,
    /// The bucket does not exist.
    NoSuchBucket,
    /// The bucket lives in another region than the client was signed for.
    WrongRegion,
    /// Anything else.
    Unexpected,
}

/// Classify a failure from its error code and HTTP status.
///
/// `not_configured` is the code the operation uses for an absent
/// configuration, if it has one.
#[must_use]
pub fn classify(
    code: Option<&str>,
    status: Option<u16>,
    not_configured: Option<&str>,
) -> ErrorClass {
    match (code, status) {
        (Some(code), _) if not_configured == Some(code) => ErrorClass::NotConfigured,
        (Some(code), _) if MISSING_CODES.contains(&code) => ErrorClass::NoSuchBucket,
        (Some(code), _) if DENIED_CODES.contains(&code) => ErrorClass::Denied,
        (Some(code), _) if WRONG_REGION_CODES.contains(&code) => ErrorClass::WrongRegion,
        (_, Some(301 | 307)) => ErrorClass::WrongRegion,
        (None, Some(404)) => ErrorClass::NoSuchBucket,
        (None, Some(403)) => ErrorClass::Denied,
        _ => ErrorClass::Unexpected,
    }
}

/// Classify an SDK error.
pub fn classify_sdk_error<E>(
    err: &SdkError<E, HttpResponse>,
    not_configured: Option<&str>,
) -> ErrorClass
where
    E: ProvideErrorMetadata,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    classify(err.code(), status, not_configured)
}

/// The bucket region S3 reported on a failed response, if any.
pub fn region_hint<E>(err: &SdkError<E, HttpResponse>) -> Option<String> {
    err.raw_response()
        .and_then(|r| r.headers().get(BUCKET_REGION_HEADER))
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ToOwned::to_owned)
}

/// Message for logs and error bodies: the provider message when present,
/// otherwise the SDK's own description.
pub fn describe<E>(err: &SdkError<E, HttpResponse>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        (Some(code), None) => code.to_owned(),
        _ => aws_sdk_s3::error::DisplayErrorContext(err).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_recognize_operation_specific_absence() {
        assert_eq!(
            classify(Some(NO_BUCKET_POLICY), Some(404), Some(NO_BUCKET_POLICY)),
            ErrorClass::NotConfigured
        );
        assert_eq!(
            classify(Some(NO_ENCRYPTION), Some(404), Some(NO_ENCRYPTION)),
            ErrorClass::NotConfigured
        );
    }

    #[test]
    fn test_should_not_treat_other_operations_absence_as_absent() {
        assert_eq!(
            classify(Some(NO_CORS), Some(404), Some(NO_BUCKET_POLICY)),
            ErrorClass::Unexpected
        );
    }

    #[test]
    fn test_should_classify_denied_and_missing_bucket_codes() {
        assert_eq!(
            classify(Some("AccessDenied"), Some(403), Some(NO_CORS)),
            ErrorClass::Denied
        );
        assert_eq!(
            classify(Some("NoSuchBucket"), Some(404), Some(NO_CORS)),
            ErrorClass::NoSuchBucket
        );
    }

    #[test]
    fn test_should_fall_back_to_status_for_bodyless_responses() {
        assert_eq!(classify(None, Some(404), None), ErrorClass::NoSuchBucket);
        assert_eq!(classify(None, Some(403), None), ErrorClass::Denied);
        assert_eq!(classify(None, Some(500), None), ErrorClass::Unexpected);
        assert_eq!(classify(None, None, None), ErrorClass::Unexpected);
    }

    #[test]
    fn test_should_classify_head_bucket_status_codes() {
        assert_eq!(
            classify(Some("NotFound"), Some(404), None),
            ErrorClass::NoSuchBucket
        );
        assert_eq!(
            classify(Some("Forbidden"), Some(403), None),
            ErrorClass::Denied
        );
    }

    #[test]
    fn test_should_classify_region_mismatch() {
        assert_eq!(classify(None, Some(301), None), ErrorClass::WrongRegion);
        assert_eq!(
            classify(Some("PermanentRedirect"), Some(301), Some(NO_CORS)),
            ErrorClass::WrongRegion
        );
        assert_eq!(
            classify(Some("AuthorizationHeaderMalformed"), Some(400), None),
            ErrorClass::WrongRegion
        );
    }

    #[test]
    fn test_should_treat_throttling_as_unexpected() {
        assert_eq!(
            classify(Some("SlowDown"), Some(503), Some(NO_BUCKET_POLICY)),
            ErrorClass::Unexpected
        );
    }
}
