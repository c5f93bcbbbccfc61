//! Recording adapter for the `VisionService` port.

use std::sync::Arc;

use serde_json::json;

use super::{record_result, SharedRecorder};
use crate::cassette::fingerprint;
use crate::ports::{PortFuture, VisionQuery, VisionReport, VisionService};

/// Records analyses while delegating to an inner service.
///
/// Images are recorded by fingerprint; the fetch already holds the bytes.
pub struct RecordingVision {
    inner: Arc<dyn VisionService>,
    recorder: SharedRecorder,
}

impl RecordingVision {
    /// Wrap `inner`, recording into `recorder`.
    pub fn new(inner: Arc<dyn VisionService>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl VisionService for RecordingVision {
    fn analyze(&self, image: &[u8], query: VisionQuery) -> PortFuture<'_, VisionReport> {
        let input = json!({ "image": fingerprint(image), "query": query });
        let call = self.inner.analyze(image, query);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "vision", "analyze", input, &result);
            result
        })
    }
}
