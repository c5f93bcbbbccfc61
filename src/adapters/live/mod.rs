//! Live adapters backed by HTTP and AWS services.

pub mod http_source;
pub mod rekognition;
pub mod s3;
pub mod sagemaker;

use aws_config::{BehaviorVersion, SdkConfig};

use crate::config::AwsConfig;

/// Resolve shared AWS settings: the configured region if any, otherwise the
/// default provider chain.
pub async fn load_sdk_config(aws: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &aws.region {
        loader = loader.region(aws_config::Region::new(region.clone()));
    }
    loader.load().await
}
