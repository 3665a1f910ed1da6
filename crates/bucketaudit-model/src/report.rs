//! Audit report and dashboard types.

use std::fmt;

use serde::Serialize;

use crate::control::{ControlId, ControlStatus};

/// Letter grade derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Grade {
    /// 90 and above.
    A,
    /// 80 to 89.
    B,
    /// 60 to 79.
    C,
    /// 40 to 59.
    D,
    /// Below 40.
    F,
}

impl Grade {
    /// Map a score to a grade. Thresholds are closed below.
    #[must_use]
    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => Self::A,
            80..=89 => Self::B,
            60..=79 => Self::C,
            40..=59 => Self::D,
            _ => Self::F,
        }
    }

    /// The grade letter.
    #[must_use]
    pub fn letter(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Risk classification shown next to the letter.
    #[must_use]
    pub fn risk_level(&self) -> &'static str {
        match self {
            Self::A => "Secure",
            Self::B => "Good",
            Self::C => "At Risk",
            Self::D => "High Risk",
            Self::F => "Critical",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.letter(), self.risk_level())
    }
}

/// Whether a bucket is reachable by unrestricted principals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Exposure {
    /// Public access blocking is absent or incomplete.
    Public,
    /// All four public access guards are on.
    Private,
}

impl Exposure {
    /// Whether the bucket is exposed.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Verdict for one control in one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlResult {
    /// Which control this is.
    pub control: ControlId,
    /// Human-readable control name.
    pub title: &'static str,
    /// What the control verifies.
    pub description: &'static str,
    /// PASS, WARN or FAIL.
    pub status: ControlStatus,
    /// What was observed.
    pub details: String,
    /// Points this control took off the score.
    pub deduction: u32,
    /// Suggested fix; present only in detailed reports for non-passing controls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

/// Full audit result for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Audited bucket.
    pub bucket_name: String,
    /// Final score in `0..=100`.
    pub security_score: u32,
    /// Grade derived from `security_score`.
    pub risk_grade: Grade,
    /// Risk classification matching `risk_grade`.
    pub risk_level: &'static str,
    /// Exposure decided by the public access block control.
    pub access_type: Exposure,
    /// Findings in evaluation order.
    pub tests: Vec<ControlResult>,
    /// Pointer to the failed controls; present only in detailed reports scoring below 100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation_note: Option<String>,
}

impl AuditReport {
    /// Look up the finding for a control.
    #[must_use]
    pub fn finding(&self, control: ControlId) -> Option<&ControlResult> {
        self.tests.iter().find(|r| r.control == control)
    }
}

/// Placeholder for a bucket that could not be audited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketError {
    /// The bucket that failed.
    pub bucket_name: String,
    /// Why it failed.
    pub error: String,
}

/// One entry in a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DashboardEntry {
    /// The bucket was audited.
    Report(AuditReport),
    /// The bucket could not be audited.
    Error(BucketError),
}

impl DashboardEntry {
    /// Bucket name of the entry, whichever kind it is.
    #[must_use]
    pub fn bucket_name(&self) -> &str {
        match self {
            Self::Report(r) => &r.bucket_name,
            Self::Error(e) => &e.bucket_name,
        }
    }

    /// The report, if the bucket was audited.
    #[must_use]
    pub fn as_report(&self) -> Option<&AuditReport> {
        match self {
            Self::Report(r) => Some(r),
            Self::Error(_) => None,
        }
    }
}

/// Aggregate of several bucket audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// Title describing how targets were selected.
    pub dashboard_title: String,
    /// Number of entries, including error placeholders.
    pub total_scanned: usize,
    /// Entries in target order.
    pub buckets: Vec<DashboardEntry>,
}

impl DashboardSummary {
    /// Build a summary, deriving the count from the entries.
    #[must_use]
    pub fn new(title: impl Into<String>, buckets: Vec<DashboardEntry>) -> Self {
        Self {
            dashboard_title: title.into(),
            total_scanned: buckets.len(),
            buckets,
        }
    }
}

/// Result of serving one audit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AuditOutcome {
    /// Single-bucket report.
    Report(AuditReport),
    /// Multi-bucket dashboard.
    Dashboard(DashboardSummary),
}
