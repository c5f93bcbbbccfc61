//! Replaying adapter for the `VisionService` port.

use serde_json::json;

use super::{replay, SharedReplayer};
use crate::cassette::fingerprint;
use crate::error::ComposeError;
use crate::ports::{PortFuture, VisionQuery, VisionReport, VisionService};

/// Serves recorded analyses, matched by image fingerprint.
pub struct ReplayingVision {
    replayer: SharedReplayer,
}

impl ReplayingVision {
    /// Replay from `replayer`.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl VisionService for ReplayingVision {
    fn analyze(&self, image: &[u8], query: VisionQuery) -> PortFuture<'_, VisionReport> {
        let input = json!({ "image": fingerprint(image), "query": query });
        let result: Result<VisionReport, _> =
            replay(&self.replayer, "vision", "analyze", &input, ComposeError::Analysis);
        Box::pin(async move { result })
    }
}
