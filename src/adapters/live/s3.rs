//! Live adapter for Amazon S3.

use std::time::Duration;

use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::error::ComposeError;
use crate::ports::{ObjectStore, PortFuture};

/// Stores objects in one bucket and signs GET URLs for them.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Create a store over `bucket` from shared AWS settings.
    #[must_use]
    pub fn new(sdk: &SdkConfig, bucket: impl Into<String>) -> Self {
        Self { client: Client::new(sdk), bucket: bucket.into() }
    }
}

impl ObjectStore for S3ObjectStore {
    fn put(&self, key: &str, body: &[u8], content_type: &str) -> PortFuture<'_, ()> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body.to_vec()));
        let key = key.to_string();
        Box::pin(async move {
            request.send().await.map_err(|e| {
                ComposeError::Publish(format!(
                    "put s3://{}/{key}: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;
            Ok(())
        })
    }

    fn presign_get(&self, key: &str, expires_in: Duration) -> PortFuture<'_, String> {
        let request = self.client.get_object().bucket(&self.bucket).key(key);
        let key = key.to_string();
        Box::pin(async move {
            let config = PresigningConfig::expires_in(expires_in)
                .map_err(|e| ComposeError::Publish(format!("presign expiry: {e}")))?;
            let presigned = request.presigned(config).await.map_err(|e| {
                ComposeError::Publish(format!(
                    "presign s3://{}/{key}: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;
            Ok(presigned.uri().to_string())
        })
    }
}
