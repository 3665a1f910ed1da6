//! Control identifiers and verdict statuses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One named security check evaluated against a bucket.
///
/// Variants are declared in evaluation order: the public-access-block control
/// must run first because it decides the bucket's exposure, which the policy
/// and CORS controls depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlId {
    /// Bucket-level Block Public Access settings.
    PublicAccessBlock,
    /// Wildcard principals in the bucket policy.
    BucketPolicy,
    /// Wildcard origins in the CORS configuration.
    Cors,
    /// Default server-side encryption.
    Encryption,
    /// Object versioning.
    Versioning,
    /// Policy-enforced TLS (`aws:SecureTransport`).
    SecureTransport,
    /// Server access logging.
    AccessLogging,
    /// Ability to mint long-lived presigned URLs.
    PresignedUrl,
}

impl ControlId {
    /// Every control, in evaluation order.
    pub const ALL: [Self; 8] = [
        Self::PublicAccessBlock,
        Self::BucketPolicy,
        Self::Cors,
        Self::Encryption,
        Self::Versioning,
        Self::SecureTransport,
        Self::AccessLogging,
        Self::PresignedUrl,
    ];

    /// Stable machine identifier, as used in JSON and weight overrides.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PublicAccessBlock => "public_access_block",
            Self::BucketPolicy => "bucket_policy",
            Self::Cors => "cors",
            Self::Encryption => "encryption",
            Self::Versioning => "versioning",
            Self::SecureTransport => "secure_transport",
            Self::AccessLogging => "access_logging",
            Self::PresignedUrl => "presigned_url",
        }
    }

    /// Human-readable control name.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::PublicAccessBlock => "Public Access Block",
            Self::BucketPolicy => "Permission Scope",
            Self::Cors => "CORS",
            Self::Encryption => "Data Encryption",
            Self::Versioning => "Data Integrity (Versioning)",
            Self::SecureTransport => "SSL/TLS Enforcement",
            Self::AccessLogging => "Access Logging",
            Self::PresignedUrl => "Presigned URL Configuration",
        }
    }

    /// What the control verifies.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::PublicAccessBlock => {
                "Verifies that bucket level settings block public ACLs and policies."
            }
            Self::BucketPolicy => "Scans the bucket policy for global 'Principal: *' allow statements.",
            Self::Cors => "Checks cross-origin rules for wildcard origins.",
            Self::Encryption => "Verifies usage of strong server-side encryption (SSE-KMS).",
            Self::Versioning => "Verifies versioning status for data recovery.",
            Self::SecureTransport => "Verifies the policy explicitly denies insecure HTTP requests.",
            Self::AccessLogging => "Checks for server access logs.",
            Self::PresignedUrl => {
                "Tests whether long-lived (7-day) access links can be generated."
            }
        }
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlId {
    type Err = String;

    /// Accepts the snake_case identifier, case-insensitively, with `-` allowed
    /// in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown control: {s}"))
    }
}

/// Outcome of evaluating one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlStatus {
    /// The control is satisfied.
    Pass,
    /// A weakness that is mitigated, informational, or low severity.
    Warn,
    /// The control is violated.
    Fail,
}

impl ControlStatus {
    /// Wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }

    /// Whether the control passed.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PASS" => Ok(Self::Pass),
            "WARN" => Ok(Self::Warn),
            "FAIL" => Ok(Self::Fail),
            _ => Err(format!("invalid control status: {s}. Use: PASS, WARN, FAIL")),
        }
    }
}
