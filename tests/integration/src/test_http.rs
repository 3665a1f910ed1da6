//! HTTP API integration tests against a running `bucketaudit-server`.

#[cfg(test)]
mod tests {
    use crate::{
        audit_server_url, cleanup_bucket, create_test_bucket, harden_bucket, s3_client,
        test_bucket_name,
    };

    async fn get(
        path: &str,
    ) -> (
        reqwest::StatusCode,
        reqwest::header::HeaderMap,
        serde_json::Value,
    ) {
        let resp = reqwest::get(format!("{}{path}", audit_server_url()))
            .await
            .expect("request");
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.json().await.expect("json body");
        (status, headers, body)
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_running_health() {
        let (status, _, body) = get("/health").await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["status"], "running");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_describe_service() {
        let (status, headers, body) = get("/info").await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["system"], "S3 Security Compliance Scanner");
        assert_eq!(body["status"], "Online");
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_require_bucket_parameter() {
        let (status, _, body) = get("/scan").await;
        assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MissingParameter");
        assert!(body["error"].as_str().unwrap().contains("/scan?bucket="));
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_scan_hardened_bucket() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "http").await;
        harden_bucket(&client, &bucket).await;

        let (status, headers, body) = get(&format!("/scan?bucket={bucket}")).await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(body["bucket_name"], bucket.as_str());
        assert_eq!(body["risk_grade"], "A");
        assert_eq!(body["access_type"], "Private");
        assert_eq!(body["tests"].as_array().unwrap().len(), 8);

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_render_targeted_dashboard() {
        let client = s3_client();
        let bucket = create_test_bucket(&client, "dash").await;
        let missing = test_bucket_name("missing");

        let (status, _, body) = get(&format!("/?buckets={bucket},{missing}")).await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["dashboard_title"], "Targeted Compliance Scan");
        assert_eq!(body["total_scanned"], 2);
        assert_eq!(body["buckets"][0]["bucket_name"], bucket.as_str());
        assert!(body["buckets"][0]["security_score"].is_u64());
        assert!(body["buckets"][0]["tests"][0].get("remediation").is_none());
        assert_eq!(body["buckets"][1]["error"], "Access Denied or Not Found");

        cleanup_bucket(&client, &bucket).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_non_get_methods() {
        let resp = reqwest::Client::new()
            .post(format!("{}/scan?bucket=any", audit_server_url()))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
    }
}
