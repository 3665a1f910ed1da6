//! Model types for the bucket audit service.
//!
//! This crate holds the vocabulary shared by the scoring engine and the HTTP
//! layer: control identifiers and verdict statuses, the per-bucket
//! [`AuditReport`] and multi-bucket [`DashboardSummary`], the parsed
//! [`AuditRequest`], and the HTTP-facing [`AuditError`].
//!
//! Report types are serialize-only. They are produced fresh for every request
//! and never read back.

pub mod control;
pub mod error;
pub mod report;
pub mod request;

pub use control::{ControlId, ControlStatus};
pub use error::{AuditError, AuditErrorCode};
pub use report::{
    AuditOutcome, AuditReport, BucketError, ControlResult, DashboardEntry, DashboardSummary,
    Exposure, Grade,
};
pub use request::{AuditRequest, DetailLevel, parse_bucket_list};
