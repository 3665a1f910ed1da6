//! Parsed audit requests.

/// How much text each finding carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailLevel {
    /// Remediation attached to every non-passing finding.
    Detailed,
    /// Remediation omitted to keep dashboard payloads compact.
    Summary,
}

/// Which buckets to audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditRequest {
    /// Deep dive on one bucket.
    Single {
        /// Target bucket.
        bucket: String,
    },
    /// Explicit list of buckets, audited in order.
    Batch {
        /// Target buckets.
        buckets: Vec<String>,
    },
    /// Every bucket visible to the caller, optionally substring-filtered.
    Account {
        /// Substring a bucket name must contain.
        filter: Option<String>,
    },
}

impl AuditRequest {
    /// Single-bucket requests are detailed; everything else is a dashboard.
    #[must_use]
    pub fn detail_level(&self) -> DetailLevel {
        match self {
            Self::Single { .. } => DetailLevel::Detailed,
            Self::Batch { .. } | Self::Account { .. } => DetailLevel::Summary,
        }
    }

    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single",
            Self::Batch { .. } => "batch",
            Self::Account { .. } => "account",
        }
    }
}

/// Split a comma-separated bucket list, trimming names and dropping blanks.
///
/// Duplicates are kept; each occurrence is audited.
#[must_use]
pub fn parse_bucket_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}
