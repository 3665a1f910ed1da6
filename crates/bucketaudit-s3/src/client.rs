//! S3 client construction.

use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use bucketaudit_core::AuditConfig;
use tracing::info;

/// Build the S3 client from the default credential chain plus the region and
/// endpoint settings in `config`.
pub async fn build_client(config: &AuditConfig) -> Client {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.default_region.clone()))
        .load()
        .await;

    let mut builder =
        aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(config.s3_force_path_style);
    if let Some(endpoint) = &config.s3_endpoint_url {
        builder = builder.endpoint_url(endpoint);
    }

    info!(
        region = %config.default_region,
        endpoint = config.s3_endpoint_url.as_deref().unwrap_or("aws"),
        path_style = config.s3_force_path_style,
        "S3 client configured"
    );
    Client::from_conf(builder.build())
}
