//! Recording adapter for the `InferenceEndpoint` port.

use std::sync::Arc;

use super::{record_result, SharedRecorder};
use crate::ports::{GenerationRequest, InferenceEndpoint, InferencePayload, PortFuture};

/// Records generation calls while delegating to an inner endpoint.
pub struct RecordingInference {
    inner: Arc<dyn InferenceEndpoint>,
    recorder: SharedRecorder,
}

impl RecordingInference {
    /// Wrap `inner`, recording into `recorder`.
    pub fn new(inner: Arc<dyn InferenceEndpoint>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl InferenceEndpoint for RecordingInference {
    fn invoke(&self, request: &GenerationRequest) -> PortFuture<'_, InferencePayload> {
        let input = serde_json::to_value(request).unwrap_or_default();
        let call = self.inner.invoke(request);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "inference", "invoke", input, &result);
            result
        })
    }
}
