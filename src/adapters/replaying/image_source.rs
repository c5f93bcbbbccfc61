//! Replaying adapter for the `ImageSource` port.

use serde_json::json;

use super::{replay, SharedReplayer};
use crate::error::ComposeError;
use crate::ports::{FetchedImage, ImageSource, PortFuture};

/// Serves recorded fetches.
pub struct ReplayingImageSource {
    replayer: SharedReplayer,
}

impl ReplayingImageSource {
    /// Replay from `replayer`.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl ImageSource for ReplayingImageSource {
    fn fetch(&self, url: &str) -> PortFuture<'_, FetchedImage> {
        let input = json!({ "url": url });
        let result: Result<FetchedImage, _> =
            replay(&self.replayer, "image_source", "fetch", &input, ComposeError::Fetch);
        Box::pin(async move { result })
    }
}
