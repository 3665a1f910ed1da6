//! Auditor integration tests against an S3-compatible provider.

#[cfg(test)]
mod tests {
    use bucketaudit_model::{
        AuditErrorCode, AuditOutcome, AuditRequest, ControlId, ControlStatus, DashboardEntry,
        Grade,
    };

    use crate::{
        auditor, cleanup_bucket, create_test_bucket, harden_bucket, s3_client, test_bucket_name,
    };

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_versioning_on_new_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "plain").await;

        let outcome = auditor()
            .execute(&AuditRequest::Single {
                bucket: bucket.clone(),
            })
            .await
            .expect("audit");
        let AuditOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };

        assert_eq!(report.bucket_name, bucket);
        assert_eq!(report.tests.len(), ControlId::ALL.len());
        assert_eq!(
            report.finding(ControlId::Versioning).unwrap().status,
            ControlStatus::Fail
        );
        assert!(report.security_score < 100);
        assert!(report.remediation_note.is_some());

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_pass_hardened_controls() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "hardened").await;
        harden_bucket(&client, &bucket).await;

        let report = auditor()
            .audit_bucket(&bucket, bucketaudit_model::DetailLevel::Detailed)
            .await
            .expect("audit");

        for control in [
            ControlId::PublicAccessBlock,
            ControlId::BucketPolicy,
            ControlId::Encryption,
            ControlId::Versioning,
            ControlId::SecureTransport,
        ] {
            assert_eq!(
                report.finding(control).unwrap().status,
                ControlStatus::Pass,
                "{control:?}"
            );
        }
        // Only logging can still deduct.
        assert!(report.security_score >= 90);
        assert_eq!(report.risk_grade, Grade::A);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_keep_missing_bucket_as_placeholder_in_batch() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "batch").await;
        let missing = test_bucket_name("missing");

        let summary = auditor()
            .audit_batch(&[bucket.clone(), missing.clone()])
            .await;

        assert_eq!(summary.total_scanned, 2);
        assert!(matches!(summary.buckets[0], DashboardEntry::Report(_)));
        let DashboardEntry::Error(placeholder) = &summary.buckets[1] else {
            panic!("expected a placeholder");
        };
        assert_eq!(placeholder.bucket_name, missing);
        assert_eq!(placeholder.error, "Access Denied or Not Found");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_missing_single_bucket() {
        let err = auditor()
            .execute(&AuditRequest::Single {
                bucket: test_bucket_name("ghost"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, AuditErrorCode::BucketNotAccessible);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_filter_account_scan() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "filtered").await;
        let excluded = format!("{bucket}-logs");
        client
            .create_bucket()
            .bucket(&excluded)
            .send()
            .await
            .expect("create_bucket");

        let summary = auditor()
            .audit_account(Some(&bucket))
            .await
            .expect("account scan");

        assert_eq!(summary.dashboard_title, format!("Account Scan ({bucket})"));
        let names: Vec<_> = summary.buckets.iter().map(DashboardEntry::bucket_name).collect();
        assert_eq!(names, vec![bucket.as_str()]);

        cleanup_bucket(&client, &bucket).await;
        cleanup_bucket(&client, &excluded).await;
    }
}
