//! [`BucketProbe`] over the AWS SDK.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::BucketVersioningStatus;
use bucketaudit_core::probe::{
    BucketPolicy, BucketProbe, CorsRule, DefaultEncryption, LoggingTarget, PresignOutcome,
    ProbeError, Probed, PublicAccessBlock, VersioningState,
};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::classify::{
    ErrorClass, NO_BUCKET_POLICY, NO_CORS, NO_ENCRYPTION, NO_PUBLIC_ACCESS_BLOCK,
    classify_sdk_error, describe, region_hint,
};

/// Probes buckets with read-only S3 calls.
///
/// Requests go through the client the probe was built with until a bucket
/// turns out to live in another region. From then on that bucket is probed
/// through a client signed for its own region, built once per region from
/// the same configuration and shared by every clone of the probe.
#[derive(Debug, Clone)]
pub struct S3Probe {
    client: Client,
    regional: Arc<DashMap<String, Client>>,
    bucket_regions: Arc<DashMap<String, String>>,
}

/// Result of a single `HeadBucket` attempt.
enum HeadOutcome {
    Found,
    MovedTo(String),
}

impl S3Probe {
    /// Wrap a configured client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            regional: Arc::new(DashMap::new()),
            bucket_regions: Arc::new(DashMap::new()),
        }
    }

    /// Region the bucket was found in, once known.
    #[must_use]
    pub fn bucket_region(&self, bucket: &str) -> Option<String> {
        self.bucket_regions.get(bucket).map(|r| r.value().clone())
    }

    fn remember_region(&self, bucket: &str, region: &str) {
        self.bucket_regions.insert(bucket.to_owned(), region.to_owned());
    }

    /// Client to use for `bucket`.
    fn client_for(&self, bucket: &str) -> Client {
        let Some(region) = self.bucket_region(bucket) else {
            return self.client.clone();
        };
        let home = self.client.config().region().map(ToString::to_string);
        if home.as_deref() == Some(region.as_str()) {
            return self.client.clone();
        }
        self.regional
            .entry(region.clone())
            .or_insert_with(|| {
                info!(%region, "building regional S3 client");
                let config = self
                    .client
                    .config()
                    .to_builder()
                    .region(Region::new(region.clone()))
                    .build();
                Client::from_conf(config)
            })
            .value()
            .clone()
    }

    async fn head(&self, bucket: &str) -> Result<HeadOutcome, ProbeError> {
        match self.client_for(bucket).head_bucket().bucket(bucket).send().await {
            Ok(resp) => {
                if let Some(region) = resp.bucket_region() {
                    self.remember_region(bucket, region);
                }
                Ok(HeadOutcome::Found)
            }
            Err(e) => match classify_sdk_error(&e, None) {
                ErrorClass::NoSuchBucket => Err(ProbeError::NoSuchBucket {
                    bucket: bucket.to_owned(),
                }),
                ErrorClass::Denied => Err(ProbeError::AccessDenied {
                    bucket: bucket.to_owned(),
                }),
                ErrorClass::WrongRegion => region_hint(&e)
                    .map(HeadOutcome::MovedTo)
                    .ok_or_else(|| ProbeError::provider("HeadBucket", bucket, describe(&e))),
                ErrorClass::NotConfigured | ErrorClass::Unexpected => {
                    Err(ProbeError::provider("HeadBucket", bucket, describe(&e)))
                }
            },
        }
    }
}

/// Turn a failed configuration read into a probe outcome or a hard error.
fn config_failure<T, E>(
    operation: &'static str,
    bucket: &str,
    err: &SdkError<E, HttpResponse>,
    not_configured: Option<&str>,
) -> Result<Probed<T>, ProbeError>
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    match classify_sdk_error(err, not_configured) {
        ErrorClass::NotConfigured => {
            debug!(bucket, operation, "configuration not set");
            Ok(Probed::Absent)
        }
        ErrorClass::Denied => {
            warn!(bucket, operation, "configuration read denied");
            Ok(Probed::Denied)
        }
        ErrorClass::NoSuchBucket => Err(ProbeError::NoSuchBucket {
            bucket: bucket.to_owned(),
        }),
        ErrorClass::WrongRegion | ErrorClass::Unexpected => {
            Err(ProbeError::provider(operation, bucket, describe(err)))
        }
    }
}

#[async_trait]
impl BucketProbe for S3Probe {
    async fn list_buckets(&self) -> Result<Vec<String>, ProbeError> {
        let mut names = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let mut req = self.client.list_buckets();
            if let Some(token) = continuation_token.take() {
                req = req.continuation_token(token);
            }
            let resp = req
                .send()
                .await
                .map_err(|e| ProbeError::provider("ListBuckets", "account", describe(&e)))?;

            names.extend(
                resp.buckets()
                    .iter()
                    .filter_map(|b| b.name().map(ToOwned::to_owned)),
            );

            match resp.continuation_token() {
                Some(token) if !token.is_empty() => continuation_token = Some(token.to_owned()),
                _ => break,
            }
        }
        debug!(count = names.len(), "listed buckets");
        Ok(names)
    }

    async fn check_bucket(&self, bucket: &str) -> Result<(), ProbeError> {
        match self.head(bucket).await? {
            HeadOutcome::Found => Ok(()),
            HeadOutcome::MovedTo(region) => {
                debug!(bucket, %region, "bucket lives in another region");
                self.remember_region(bucket, &region);
                match self.head(bucket).await? {
                    HeadOutcome::Found => Ok(()),
                    HeadOutcome::MovedTo(again) => Err(ProbeError::provider(
                        "HeadBucket",
                        bucket,
                        format!("redirected from {region} to {again}"),
                    )),
                }
            }
        }
    }

    async fn public_access_block(
        &self,
        bucket: &str,
    ) -> Result<Probed<PublicAccessBlock>, ProbeError> {
        match self.client_for(bucket).get_public_access_block().bucket(bucket).send().await {
            Ok(resp) => Ok(resp
                .public_access_block_configuration()
                .map_or(Probed::Absent, |c| {
                    Probed::Found(PublicAccessBlock {
                        block_public_acls: c.block_public_acls().unwrap_or(false),
                        ignore_public_acls: c.ignore_public_acls().unwrap_or(false),
                        block_public_policy: c.block_public_policy().unwrap_or(false),
                        restrict_public_buckets: c.restrict_public_buckets().unwrap_or(false),
                    })
                })),
            Err(e) => config_failure(
                "GetPublicAccessBlock",
                bucket,
                &e,
                Some(NO_PUBLIC_ACCESS_BLOCK),
            ),
        }
    }

    async fn encryption(&self, bucket: &str) -> Result<Probed<DefaultEncryption>, ProbeError> {
        match self.client_for(bucket).get_bucket_encryption().bucket(bucket).send().await {
            Ok(resp) => {
                let found = resp
                    .server_side_encryption_configuration()
                    .and_then(|c| {
                        c.rules().iter().find_map(|rule| {
                            rule.apply_server_side_encryption_by_default()
                                .map(|d| DefaultEncryption {
                                    sse_algorithm: d.sse_algorithm().as_str().to_owned(),
                                    kms_master_key_id: d.kms_master_key_id().map(ToOwned::to_owned),
                                    bucket_key_enabled: rule.bucket_key_enabled().unwrap_or(false),
                                })
                        })
                    });
                Ok(found.map_or(Probed::Absent, Probed::Found))
            }
            Err(e) => config_failure("GetBucketEncryption", bucket, &e, Some(NO_ENCRYPTION)),
        }
    }

    async fn policy(&self, bucket: &str) -> Result<Probed<BucketPolicy>, ProbeError> {
        match self.client_for(bucket).get_bucket_policy().bucket(bucket).send().await {
            Ok(resp) => Ok(match resp.policy() {
                Some(raw) if !raw.trim().is_empty() => Probed::Found(BucketPolicy::new(raw)),
                _ => Probed::Absent,
            }),
            Err(e) => config_failure("GetBucketPolicy", bucket, &e, Some(NO_BUCKET_POLICY)),
        }
    }

    async fn versioning(&self, bucket: &str) -> Result<Probed<VersioningState>, ProbeError> {
        match self.client_for(bucket).get_bucket_versioning().bucket(bucket).send().await {
            Ok(resp) => Ok(match resp.status() {
                Some(BucketVersioningStatus::Enabled) => Probed::Found(VersioningState::Enabled),
                Some(BucketVersioningStatus::Suspended) => {
                    Probed::Found(VersioningState::Suspended)
                }
                _ => Probed::Absent,
            }),
            Err(e) => config_failure("GetBucketVersioning", bucket, &e, None),
        }
    }

    async fn cors(&self, bucket: &str) -> Result<Probed<Vec<CorsRule>>, ProbeError> {
        match self.client_for(bucket).get_bucket_cors().bucket(bucket).send().await {
            Ok(resp) => {
                let rules: Vec<CorsRule> = resp
                    .cors_rules()
                    .iter()
                    .map(|r| CorsRule {
                        allowed_origins: r.allowed_origins().to_vec(),
                        allowed_methods: r.allowed_methods().to_vec(),
                    })
                    .collect();
                Ok(if rules.is_empty() {
                    Probed::Absent
                } else {
                    Probed::Found(rules)
                })
            }
            Err(e) => config_failure("GetBucketCors", bucket, &e, Some(NO_CORS)),
        }
    }

    async fn logging(&self, bucket: &str) -> Result<Probed<LoggingTarget>, ProbeError> {
        match self.client_for(bucket).get_bucket_logging().bucket(bucket).send().await {
            Ok(resp) => Ok(resp.logging_enabled().map_or(Probed::Absent, |l| {
                Probed::Found(LoggingTarget {
                    target_bucket: l.target_bucket().to_owned(),
                    target_prefix: l.target_prefix().to_owned(),
                })
            })),
            Err(e) => config_failure("GetBucketLogging", bucket, &e, None),
        }
    }

    async fn presign_download(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> PresignOutcome {
        let config = match PresigningConfig::expires_in(expires_in) {
            Ok(config) => config,
            Err(e) => {
                return PresignOutcome::Blocked {
                    reason: e.to_string(),
                };
            }
        };
        match self
            .client_for(bucket)
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
        {
            Ok(_) => PresignOutcome::Generated,
            Err(e) => {
                debug!(bucket, error = %e, "presigning failed");
                PresignOutcome::Blocked {
                    reason: describe(&e),
                }
            }
        }
    }
}
