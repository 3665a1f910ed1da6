//! Request orchestration.
//!
//! [`Auditor`] resolves an [`AuditRequest`] into bucket names, runs the
//! probes and the engine for each one sequentially, and wraps multi-bucket
//! results in a [`DashboardSummary`]. In batch and account mode a bucket that
//! cannot be audited becomes a placeholder entry instead of failing the
//! request.

use bucketaudit_model::{
    AuditError, AuditOutcome, AuditReport, AuditRequest, BucketError, DashboardEntry,
    DashboardSummary, DetailLevel,
};
use tracing::{error, info, warn};

use crate::config::AuditConfig;
use crate::engine::{self, ScoringPolicy};
use crate::probe::{BucketProbe, ProbeError, ProbeSet};
use crate::targets;

/// Audits buckets through a [`BucketProbe`].
#[derive(Debug)]
pub struct Auditor<P> {
    probe: P,
    scoring: ScoringPolicy,
    excluded: Vec<String>,
}

impl<P: BucketProbe> Auditor<P> {
    /// Build an auditor with the scoring and exclusion settings of `config`.
    #[must_use]
    pub fn new(probe: P, config: &AuditConfig) -> Self {
        Self::with_policy(
            probe,
            config.scoring_policy(),
            config.excluded_name_patterns.clone(),
        )
    }

    /// Build an auditor from explicit settings.
    #[must_use]
    pub fn with_policy(probe: P, scoring: ScoringPolicy, excluded: Vec<String>) -> Self {
        Self {
            probe,
            scoring,
            excluded,
        }
    }

    /// The underlying probe.
    #[must_use]
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Serve one audit request.
    pub async fn execute(&self, request: &AuditRequest) -> Result<AuditOutcome, AuditError> {
        match request {
            AuditRequest::Single { bucket } => {
                let report = self.audit_bucket(bucket, request.detail_level()).await?;
                Ok(AuditOutcome::Report(report))
            }
            AuditRequest::Batch { buckets } => {
                Ok(AuditOutcome::Dashboard(self.audit_batch(buckets).await))
            }
            AuditRequest::Account { filter } => {
                let summary = self.audit_account(filter.as_deref()).await?;
                Ok(AuditOutcome::Dashboard(summary))
            }
        }
    }

    /// Audit one bucket.
    ///
    /// The bucket's existence is checked before any configuration probe, so
    /// a missing bucket fails fast with [`ProbeError::NoSuchBucket`].
    pub async fn audit_bucket(
        &self,
        bucket: &str,
        detail: DetailLevel,
    ) -> Result<AuditReport, ProbeError> {
        self.probe.check_bucket(bucket).await?;
        let probes = ProbeSet::collect(&self.probe, bucket).await?;
        let report = engine::assess(bucket, &probes, &self.scoring, detail);

        info!(
            bucket,
            score = report.security_score,
            grade = report.risk_grade.letter(),
            access = ?report.access_type,
            "bucket audited"
        );
        Ok(report)
    }

    /// Audit an explicit list of buckets in order, isolating failures.
    pub async fn audit_batch(&self, buckets: &[String]) -> DashboardSummary {
        let mut entries = Vec::with_capacity(buckets.len());
        for bucket in buckets {
            entries.push(self.audit_entry(bucket).await);
        }
        DashboardSummary::new(targets::TARGETED_SCAN_TITLE, entries)
    }

    /// Audit every listed bucket that passes the filter and exclusions.
    ///
    /// Only a failure to list buckets fails the whole scan.
    pub async fn audit_account(
        &self,
        filter: Option<&str>,
    ) -> Result<DashboardSummary, ProbeError> {
        let listed = self.probe.list_buckets().await?;
        let listed_count = listed.len();
        let selected = targets::select_account_buckets(listed, filter, &self.excluded);

        info!(
            listed = listed_count,
            selected = selected.len(),
            filter = filter.unwrap_or(""),
            "account scan targets resolved"
        );

        let mut entries = Vec::with_capacity(selected.len());
        for bucket in &selected {
            entries.push(self.audit_entry(bucket).await);
        }
        Ok(DashboardSummary::new(
            targets::account_scan_title(filter),
            entries,
        ))
    }

    async fn audit_entry(&self, bucket: &str) -> DashboardEntry {
        match self.audit_bucket(bucket, DetailLevel::Summary).await {
            Ok(report) => DashboardEntry::Report(report),
            Err(e) if e.is_inaccessible() => {
                warn!(bucket, error = %e, "bucket not accessible, recording placeholder");
                DashboardEntry::Error(BucketError {
                    bucket_name: bucket.to_owned(),
                    error: targets::INACCESSIBLE_BUCKET_MESSAGE.to_owned(),
                })
            }
            Err(e) => {
                error!(bucket, error = %e, "bucket audit failed");
                DashboardEntry::Error(BucketError {
                    bucket_name: bucket.to_owned(),
                    error: e.to_string(),
                })
            }
        }
    }
}
