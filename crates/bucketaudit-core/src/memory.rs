//! In-memory [`BucketProbe`] backed by fixed fixtures.
//!
//! [`StaticProbe`] answers every probe from a [`BucketFixture`] registered
//! up front. It can also simulate buckets the caller may not access and
//! buckets whose provider calls fail, and it counts how many probe calls it
//! served so callers can assert that nothing reached the provider.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::probe::{
    BucketPolicy, BucketProbe, CorsRule, DefaultEncryption, LoggingTarget, PresignOutcome,
    ProbeError, Probed, PublicAccessBlock, VersioningState,
};

/// A policy that only denies plain-HTTP requests.
pub const TLS_ONLY_POLICY: &str = r#"{
    "Version": "2012-10-17",
    "Statement": [{
        "Sid": "DenyInsecureTransport",
        "Effect": "Deny",
        "Principal": "*",
        "Action": "s3:*",
        "Resource": "*",
        "Condition": {"Bool": {"aws:SecureTransport": "false"}}
    }]
}"#;

/// Configuration of one simulated bucket.
///
/// The default fixture has nothing configured and lets presigned URLs be
/// generated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketFixture {
    /// Block Public Access settings.
    pub public_access_block: Probed<PublicAccessBlock>,
    /// Default encryption.
    pub encryption: Probed<DefaultEncryption>,
    /// Bucket policy.
    pub policy: Probed<BucketPolicy>,
    /// Versioning.
    pub versioning: Probed<VersioningState>,
    /// CORS rules.
    pub cors: Probed<Vec<CorsRule>>,
    /// Access logging.
    pub logging: Probed<LoggingTarget>,
    /// Presigned URL simulation.
    pub presign: PresignOutcome,
}

impl BucketFixture {
    /// A bucket that satisfies every deducting control.
    #[must_use]
    pub fn hardened() -> Self {
        let mut encryption = DefaultEncryption::new("aws:kms");
        encryption.kms_master_key_id = Some("alias/audit".to_owned());
        encryption.bucket_key_enabled = true;

        Self {
            public_access_block: Probed::Found(PublicAccessBlock::locked_down()),
            encryption: Probed::Found(encryption),
            policy: Probed::Found(BucketPolicy::new(TLS_ONLY_POLICY)),
            versioning: Probed::Found(VersioningState::Enabled),
            cors: Probed::Absent,
            logging: Probed::Found(LoggingTarget {
                target_bucket: "audit-access-logs".to_owned(),
                target_prefix: "s3/".to_owned(),
            }),
            presign: PresignOutcome::Generated,
        }
    }

    /// Replace the policy with raw JSON.
    #[must_use]
    pub fn with_policy(mut self, raw: &str) -> Self {
        self.policy = Probed::Found(BucketPolicy::new(raw));
        self
    }
}

/// A [`BucketProbe`] that serves fixtures from memory.
#[derive(Debug, Default)]
pub struct StaticProbe {
    buckets: Vec<(String, BucketFixture)>,
    denied: BTreeSet<String>,
    failing: BTreeMap<String, String>,
    listing_failure: Option<String>,
    calls: AtomicUsize,
}

impl StaticProbe {
    /// An empty account.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bucket. Listing order follows registration order.
    #[must_use]
    pub fn with_bucket(mut self, name: impl Into<String>, fixture: BucketFixture) -> Self {
        self.buckets.push((name.into(), fixture));
        self
    }

    /// Register a bucket that is listed but refuses every call.
    #[must_use]
    pub fn with_denied_bucket(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.denied.insert(name.clone());
        self.buckets.push((name, BucketFixture::default()));
        self
    }

    /// Make every configuration call for a registered bucket fail with
    /// `message`, after the existence check succeeds.
    #[must_use]
    pub fn with_failing_bucket(
        mut self,
        name: impl Into<String>,
        fixture: BucketFixture,
        message: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.failing.insert(name.clone(), message.into());
        self.buckets.push((name, fixture));
        self
    }

    /// Make listing fail with `message`.
    #[must_use]
    pub fn with_listing_failure(mut self, message: impl Into<String>) -> Self {
        self.listing_failure = Some(message.into());
        self
    }

    /// Number of probe calls served so far, presigning included.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    fn lookup(&self, bucket: &str) -> Result<&BucketFixture, ProbeError> {
        if self.denied.contains(bucket) {
            return Err(ProbeError::AccessDenied {
                bucket: bucket.to_owned(),
            });
        }
        self.buckets
            .iter()
            .find(|(name, _)| name == bucket)
            .map(|(_, fixture)| fixture)
            .ok_or_else(|| ProbeError::NoSuchBucket {
                bucket: bucket.to_owned(),
            })
    }

    fn config(&self, operation: &'static str, bucket: &str) -> Result<&BucketFixture, ProbeError> {
        self.record_call();
        let fixture = self.lookup(bucket)?;
        match self.failing.get(bucket) {
            Some(message) => Err(ProbeError::provider(operation, bucket, message.clone())),
            None => Ok(fixture),
        }
    }
}

#[async_trait]
impl BucketProbe for StaticProbe {
    async fn list_buckets(&self) -> Result<Vec<String>, ProbeError> {
        self.record_call();
        if let Some(message) = &self.listing_failure {
            return Err(ProbeError::provider("ListBuckets", "account", message.clone()));
        }
        Ok(self.buckets.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn check_bucket(&self, bucket: &str) -> Result<(), ProbeError> {
        self.record_call();
        self.lookup(bucket).map(|_| ())
    }

    async fn public_access_block(
        &self,
        bucket: &str,
    ) -> Result<Probed<PublicAccessBlock>, ProbeError> {
        Ok(self
            .config("GetPublicAccessBlock", bucket)?
            .public_access_block
            .clone())
    }

    async fn encryption(&self, bucket: &str) -> Result<Probed<DefaultEncryption>, ProbeError> {
        Ok(self.config("GetBucketEncryption", bucket)?.encryption.clone())
    }

    async fn policy(&self, bucket: &str) -> Result<Probed<BucketPolicy>, ProbeError> {
        Ok(self.config("GetBucketPolicy", bucket)?.policy.clone())
    }

    async fn versioning(&self, bucket: &str) -> Result<Probed<VersioningState>, ProbeError> {
        Ok(self.config("GetBucketVersioning", bucket)?.versioning.clone())
    }

    async fn cors(&self, bucket: &str) -> Result<Probed<Vec<CorsRule>>, ProbeError> {
        Ok(self.config("GetBucketCors", bucket)?.cors.clone())
    }

    async fn logging(&self, bucket: &str) -> Result<Probed<LoggingTarget>, ProbeError> {
        Ok(self.config("GetBucketLogging", bucket)?.logging.clone())
    }

    async fn presign_download(
        &self,
        bucket: &str,
        _key: &str,
        _expires_in: Duration,
    ) -> PresignOutcome {
        self.record_call();
        match self.lookup(bucket) {
            Ok(fixture) => fixture.presign.clone(),
            Err(e) => PresignOutcome::Blocked {
                reason: e.to_string(),
            },
        }
    }
}
