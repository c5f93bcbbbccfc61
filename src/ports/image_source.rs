//! Image source port: fetch raw image bytes by URL.

use serde::{Deserialize, Serialize};

use super::{base64_bytes, PortFuture};

/// Raw bytes of a fetched image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedImage {
    /// The response body.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// Retrieves images referenced by URL. One attempt per call, no retries.
pub trait ImageSource: Send + Sync {
    /// Fetch the image at `url`.
    fn fetch(&self, url: &str) -> PortFuture<'_, FetchedImage>;
}
