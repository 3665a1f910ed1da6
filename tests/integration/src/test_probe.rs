//! S3 probe integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::types::{
        BucketVersioningStatus, CorsConfiguration, CorsRule, VersioningConfiguration,
    };
    use bucketaudit_core::probe::{ProbeSet, VersioningState};
    use bucketaudit_core::{BucketProbe, ProbeError, Probed};
    use bucketaudit_s3::S3Probe;

    use crate::{
        cleanup_bucket, create_test_bucket, s3_client, test_bucket_name, tls_only_policy,
    };

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_list_created_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "list").await;
        let probe = S3Probe::new(client.clone());

        let names = probe.list_buckets().await.expect("list_buckets");
        assert!(names.contains(&bucket));

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_missing_bucket_as_inaccessible() {
        let probe = S3Probe::new(s3_client());
        let err = probe
            .check_bucket(&test_bucket_name("missing"))
            .await
            .unwrap_err();
        assert!(err.is_inaccessible(), "unexpected error: {err}");
        assert!(matches!(
            err,
            ProbeError::NoSuchBucket { .. } | ProbeError::AccessDenied { .. }
        ));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_read_absent_configuration_on_new_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "fresh").await;
        let probe = S3Probe::new(client.clone());

        assert_eq!(probe.policy(&bucket).await.unwrap(), Probed::Absent);
        assert_eq!(probe.cors(&bucket).await.unwrap(), Probed::Absent);
        assert_eq!(probe.versioning(&bucket).await.unwrap(), Probed::Absent);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_read_attached_configuration() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "attached").await;

        client
            .put_bucket_versioning()
            .bucket(&bucket)
            .versioning_configuration(
                VersioningConfiguration::builder()
                    .status(BucketVersioningStatus::Enabled)
                    .build(),
            )
            .send()
            .await
            .expect("put_bucket_versioning");

        let rule = CorsRule::builder()
            .allowed_origins("*")
            .allowed_methods("GET")
            .build()
            .expect("build cors rule");
        client
            .put_bucket_cors()
            .bucket(&bucket)
            .cors_configuration(
                CorsConfiguration::builder()
                    .cors_rules(rule)
                    .build()
                    .expect("build cors config"),
            )
            .send()
            .await
            .expect("put_bucket_cors");

        client
            .put_bucket_policy()
            .bucket(&bucket)
            .policy(tls_only_policy(&bucket))
            .send()
            .await
            .expect("put_bucket_policy");

        let probe = S3Probe::new(client.clone());
        let probes = ProbeSet::collect(&probe, &bucket).await.expect("collect");

        assert_eq!(probes.versioning, Probed::Found(VersioningState::Enabled));
        let cors = probes.cors.found().expect("cors rules");
        assert!(cors.iter().any(bucketaudit_core::probe::CorsRule::allows_any_origin));
        let policy = probes.policy.found().expect("bucket policy");
        assert!(policy.document().expect("policy json").enforces_secure_transport());

        cleanup_bucket(&client, &bucket).await;
    }
}
