//! Live adapter for a SageMaker inference endpoint.

use aws_config::SdkConfig;
use aws_sdk_sagemakerruntime::error::DisplayErrorContext;
use aws_sdk_sagemakerruntime::primitives::Blob;
use aws_sdk_sagemakerruntime::Client;
use tracing::debug;

use crate::error::ComposeError;
use crate::ports::{GenerationRequest, InferenceEndpoint, InferencePayload, PortFuture};

/// Posts generation requests to a named endpoint as JSON.
pub struct SageMakerEndpoint {
    client: Client,
    endpoint: String,
}

impl SageMakerEndpoint {
    /// Create a client for `endpoint` from shared AWS settings.
    #[must_use]
    pub fn new(sdk: &SdkConfig, endpoint: impl Into<String>) -> Self {
        Self { client: Client::new(sdk), endpoint: endpoint.into() }
    }
}

impl InferenceEndpoint for SageMakerEndpoint {
    fn invoke(&self, request: &GenerationRequest) -> PortFuture<'_, InferencePayload> {
        let body = serde_json::to_vec(request);
        Box::pin(async move {
            let body = body.map_err(|e| ComposeError::Generation(format!("encode request: {e}")))?;
            debug!(endpoint = %self.endpoint, bytes = body.len(), "invoking endpoint");

            let output = self
                .client
                .invoke_endpoint()
                .endpoint_name(&self.endpoint)
                .content_type("application/json")
                .accept("application/json")
                .body(Blob::new(body))
                .send()
                .await
                .map_err(|e| {
                    ComposeError::Generation(format!(
                        "{} invocation failed: {}",
                        self.endpoint,
                        DisplayErrorContext(&e)
                    ))
                })?;

            Ok(payload_from(output.body))
        })
    }
}

/// A response without a body yields an empty payload, which extraction
/// then reports as having no image data.
fn payload_from(body: Option<Blob>) -> InferencePayload {
    InferencePayload { body: body.map(Blob::into_inner).unwrap_or_default() }
}
