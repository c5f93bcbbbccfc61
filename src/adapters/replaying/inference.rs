//! Replaying adapter for the `InferenceEndpoint` port.

use super::{replay, SharedReplayer};
use crate::error::ComposeError;
use crate::ports::{GenerationRequest, InferenceEndpoint, InferencePayload, PortFuture};

/// Serves recorded generation responses.
pub struct ReplayingInference {
    replayer: SharedReplayer,
}

impl ReplayingInference {
    /// Replay from `replayer`.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl InferenceEndpoint for ReplayingInference {
    fn invoke(&self, request: &GenerationRequest) -> PortFuture<'_, InferencePayload> {
        let input = serde_json::to_value(request).unwrap_or_default();
        let result: Result<InferencePayload, _> =
            replay(&self.replayer, "inference", "invoke", &input, ComposeError::Generation);
        Box::pin(async move { result })
    }
}
