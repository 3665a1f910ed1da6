//! The probe contract between the scoring engine and a storage provider.
//!
//! A [`BucketProbe`] answers read-only configuration questions about a
//! bucket. Every configuration probe distinguishes three outcomes through
//! [`Probed`]: the configuration exists, it is absent, or the caller may not
//! read it. Anything else (throttling, network failure, a bucket vanishing
//! mid-scan) is a [`ProbeError`] and aborts the audit of that bucket.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::policy::PolicyDocument;

/// Object key used when simulating presigned URL generation.
pub const PRESIGN_PROBE_KEY: &str = "test.txt";

/// Lifetime requested for the simulated presigned URL (7 days, the SigV4 maximum).
pub const PRESIGN_PROBE_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Result of reading one configuration resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Probed<T> {
    /// The configuration exists.
    Found(T),
    /// No configuration is attached.
    #[default]
    Absent,
    /// The caller is not allowed to read the configuration.
    Denied,
}

impl<T> Probed<T> {
    /// The configuration, if it was found.
    pub fn found(&self) -> Option<&T> {
        match self {
            Self::Found(v) => Some(v),
            Self::Absent | Self::Denied => None,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::Absent => "absent",
            Self::Denied => "denied",
        }
    }
}

/// Block Public Access settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct PublicAccessBlock {
    /// Reject requests that set public ACLs.
    pub block_public_acls: bool,
    /// Ignore existing public ACLs.
    pub ignore_public_acls: bool,
    /// Reject public bucket policies.
    pub block_public_policy: bool,
    /// Restrict access granted by public policies.
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlock {
    /// All four guards on.
    #[must_use]
    pub fn locked_down() -> Self {
        Self {
            block_public_acls: true,
            ignore_public_acls: true,
            block_public_policy: true,
            restrict_public_buckets: true,
        }
    }

    /// Whether every guard is on.
    #[must_use]
    pub fn all_enabled(&self) -> bool {
        self.block_public_acls
            && self.ignore_public_acls
            && self.block_public_policy
            && self.restrict_public_buckets
    }

    /// Names of the guards that are off.
    #[must_use]
    pub fn disabled_guards(&self) -> Vec<&'static str> {
        [
            ("BlockPublicAcls", self.block_public_acls),
            ("IgnorePublicAcls", self.ignore_public_acls),
            ("BlockPublicPolicy", self.block_public_policy),
            ("RestrictPublicBuckets", self.restrict_public_buckets),
        ]
        .into_iter()
        .filter_map(|(name, on)| (!on).then_some(name))
        .collect()
    }
}

/// Default server-side encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultEncryption {
    /// Algorithm, e.g. `AES256`, `aws:kms`, `aws:kms:dsse`.
    pub sse_algorithm: String,
    /// KMS key for the KMS algorithms.
    pub kms_master_key_id: Option<String>,
    /// Whether an S3 Bucket Key is enabled.
    pub bucket_key_enabled: bool,
}

impl DefaultEncryption {
    /// Encryption with the given algorithm and nothing else.
    #[must_use]
    pub fn new(sse_algorithm: impl Into<String>) -> Self {
        Self {
            sse_algorithm: sse_algorithm.into(),
            kms_master_key_id: None,
            bucket_key_enabled: false,
        }
    }

    /// Whether the algorithm is one of the KMS-backed variants.
    #[must_use]
    pub fn is_kms(&self) -> bool {
        matches!(self.sse_algorithm.as_str(), "aws:kms" | "aws:kms:dsse")
    }
}

/// Raw bucket policy text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPolicy {
    /// The policy JSON as returned by the provider.
    pub raw: String,
}

impl BucketPolicy {
    /// Wrap raw policy text.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Parse the policy into statements.
    pub fn document(&self) -> Result<PolicyDocument, serde_json::Error> {
        PolicyDocument::parse(&self.raw)
    }
}

/// Versioning configuration that has been set at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersioningState {
    /// New object versions are kept.
    Enabled,
    /// Versioning was on and has been paused.
    Suspended,
}

/// One CORS rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsRule {
    /// Origins allowed to make cross-origin requests.
    pub allowed_origins: Vec<String>,
    /// Methods those origins may use.
    pub allowed_methods: Vec<String>,
}

impl CorsRule {
    /// Whether any origin is allowed.
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o.trim() == "*")
    }
}

/// Server access logging destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingTarget {
    /// Bucket receiving the logs.
    pub target_bucket: String,
    /// Key prefix for log objects.
    pub target_prefix: String,
}

/// Whether a long-lived presigned URL could be minted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PresignOutcome {
    /// A URL with the requested lifetime was produced.
    #[default]
    Generated,
    /// Signing failed, e.g. for lack of credentials.
    Blocked {
        /// Why signing failed.
        reason: String,
    },
}

/// Errors that end the audit of a bucket.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The bucket does not exist.
    #[error("bucket {bucket} does not exist")]
    NoSuchBucket {
        /// The missing bucket.
        bucket: String,
    },

    /// The caller may not access the bucket at all.
    #[error("access denied to bucket {bucket}")]
    AccessDenied {
        /// The protected bucket.
        bucket: String,
    },

    /// An unexpected provider failure.
    #[error("{operation} failed for {target}: {message}")]
    Provider {
        /// The provider call that failed.
        operation: &'static str,
        /// Bucket name, or `account` for account-level calls.
        target: String,
        /// Provider message.
        message: String,
    },
}

impl ProbeError {
    /// Build an unexpected provider error.
    #[must_use]
    pub fn provider(
        operation: &'static str,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provider {
            operation,
            target: target.into(),
            message: message.into(),
        }
    }

    /// Whether the error means the bucket is missing or off-limits, as
    /// opposed to a provider malfunction.
    #[must_use]
    pub fn is_inaccessible(&self) -> bool {
        matches!(self, Self::NoSuchBucket { .. } | Self::AccessDenied { .. })
    }
}

/// Read-only configuration queries against a storage provider.
#[async_trait]
pub trait BucketProbe: Send + Sync + 'static {
    /// Names of every bucket visible to the caller.
    async fn list_buckets(&self) -> Result<Vec<String>, ProbeError>;

    /// Confirm the bucket exists and is reachable.
    async fn check_bucket(&self, bucket: &str) -> Result<(), ProbeError>;

    /// Block Public Access settings.
    async fn public_access_block(
        &self,
        bucket: &str,
    ) -> Result<Probed<PublicAccessBlock>, ProbeError>;

    /// Default encryption.
    async fn encryption(&self, bucket: &str) -> Result<Probed<DefaultEncryption>, ProbeError>;

    /// Bucket policy.
    async fn policy(&self, bucket: &str) -> Result<Probed<BucketPolicy>, ProbeError>;

    /// Versioning state; never configured is `Absent`.
    async fn versioning(&self, bucket: &str) -> Result<Probed<VersioningState>, ProbeError>;

    /// CORS rules.
    async fn cors(&self, bucket: &str) -> Result<Probed<Vec<CorsRule>>, ProbeError>;

    /// Access logging; disabled is `Absent`.
    async fn logging(&self, bucket: &str) -> Result<Probed<LoggingTarget>, ProbeError>;

    /// Try to sign a GET URL for `key` valid for `expires_in`.
    ///
    /// Signing is local; no request reaches the provider.
    async fn presign_download(&self, bucket: &str, key: &str, expires_in: Duration)
    -> PresignOutcome;
}

/// Everything the engine needs to know about one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeSet {
    /// Block Public Access settings.
    pub public_access_block: Probed<PublicAccessBlock>,
    /// Bucket policy.
    pub policy: Probed<BucketPolicy>,
    /// CORS rules.
    pub cors: Probed<Vec<CorsRule>>,
    /// Default encryption.
    pub encryption: Probed<DefaultEncryption>,
    /// Versioning.
    pub versioning: Probed<VersioningState>,
    /// Access logging.
    pub logging: Probed<LoggingTarget>,
    /// Presigned URL simulation.
    pub presign: PresignOutcome,
}

impl ProbeSet {
    /// Run every probe against `bucket`, one after another.
    ///
    /// The policy is fetched once and shared by the permission-scope and
    /// secure-transport controls.
    pub async fn collect<P>(probe: &P, bucket: &str) -> Result<Self, ProbeError>
    where
        P: BucketProbe + ?Sized,
    {
        let public_access_block = probe.public_access_block(bucket).await?;
        let policy = probe.policy(bucket).await?;
        let cors = probe.cors(bucket).await?;
        let encryption = probe.encryption(bucket).await?;
        let versioning = probe.versioning(bucket).await?;
        let logging = probe.logging(bucket).await?;
        let presign = probe
            .presign_download(bucket, PRESIGN_PROBE_KEY, PRESIGN_PROBE_EXPIRY)
            .await;

        debug!(
            bucket,
            public_access_block = public_access_block.label(),
            policy = policy.label(),
            cors = cors.label(),
            encryption = encryption.label(),
            versioning = versioning.label(),
            logging = logging.label(),
            "collected bucket configuration"
        );

        Ok(Self {
            public_access_block,
            policy,
            cors,
            encryption,
            versioning,
            logging,
            presign,
        })
    }
}
