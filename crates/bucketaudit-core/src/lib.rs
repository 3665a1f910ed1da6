//! Scoring engine for the bucket audit service.
//!
//! The crate is organised bottom-up:
//!
//! - [`probe`]: the [`BucketProbe`] contract and the configuration values it
//!   returns, each wrapped in [`Probed`] to separate "absent" and "denied"
//!   from real failures.
//! - [`policy`]: structured parsing of bucket policy documents.
//! - [`rules`]: one pure classification function per control.
//! - [`engine`]: the weighted fold from verdicts to an
//!   [`AuditReport`](bucketaudit_model::AuditReport).
//! - [`targets`] and [`auditor`]: target resolution and per-request
//!   orchestration.
//! - [`memory`]: an in-memory probe for tests and local runs.

pub mod auditor;
pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod policy;
pub mod probe;
pub mod rules;
pub mod targets;
pub mod weights;

pub use auditor::Auditor;
pub use config::AuditConfig;
pub use engine::{ScoringPolicy, assess};
pub use memory::{BucketFixture, StaticProbe};
pub use probe::{BucketProbe, ProbeError, ProbeSet, Probed};
pub use weights::Weights;
