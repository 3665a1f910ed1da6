//! Conversion from probe failures to HTTP-facing errors.
//!
//! A missing or off-limits bucket becomes `BucketNotAccessible` (404); any
//! other provider failure becomes `ProviderError` (500) carrying the provider
//! message.
//!
//! ```
//! use bucketaudit_core::probe::ProbeError;
//! use bucketaudit_model::{AuditError, AuditErrorCode};
//!
//! let err: AuditError = ProbeError::NoSuchBucket { bucket: "ghost".to_owned() }.into();
//! assert_eq!(err.code, AuditErrorCode::BucketNotAccessible);
//! ```

use bucketaudit_model::AuditError;

use crate::probe::ProbeError;

impl From<ProbeError> for AuditError {
    fn from(err: ProbeError) -> Self {
        match &err {
            ProbeError::NoSuchBucket { bucket } | ProbeError::AccessDenied { bucket } => {
                AuditError::bucket_not_accessible(bucket).with_source(err)
            }
            ProbeError::Provider { .. } => {
                AuditError::provider_error(format!("Internal Error: {err}")).with_source(err)
            }
        }
    }
}
