//! Recording adapter for the `ImageSource` port.

use std::sync::Arc;

use serde_json::json;

use super::{record_result, SharedRecorder};
use crate::ports::{FetchedImage, ImageSource, PortFuture};

/// Records fetches while delegating to an inner source.
pub struct RecordingImageSource {
    inner: Arc<dyn ImageSource>,
    recorder: SharedRecorder,
}

impl RecordingImageSource {
    /// Wrap `inner`, recording into `recorder`.
    pub fn new(inner: Arc<dyn ImageSource>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl ImageSource for RecordingImageSource {
    fn fetch(&self, url: &str) -> PortFuture<'_, FetchedImage> {
        let input = json!({ "url": url });
        let call = self.inner.fetch(url);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "image_source", "fetch", input, &result);
            result
        })
    }
}
