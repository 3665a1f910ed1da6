//! S3 provider for the bucket audit service.
//!
//! [`S3Probe`] implements [`BucketProbe`](bucketaudit_core::BucketProbe)
//! with read-only `aws-sdk-s3` calls. [`classify`] maps SDK errors onto the
//! probe's absent / denied / missing-bucket / unexpected outcomes.

pub mod classify;
pub mod client;
pub mod probe;

pub use client::build_client;
pub use probe::S3Probe;
