//! Outbound collaborators of the pipeline, one trait each.
//!
//! The pipeline only sees these traits; live, recording and replaying
//! implementations live under `adapters/`.

pub mod image_source;
pub mod inference;
pub mod object_store;
pub mod vision;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::ComposeError;

pub use image_source::{FetchedImage, ImageSource};
pub use inference::{GenerationRequest, InferenceEndpoint, InferencePayload};
pub use object_store::ObjectStore;
pub use vision::{VisionQuery, VisionReport, VisionService};

/// Boxed future returned by every port method.
pub type PortFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ComposeError>> + Send + 'a>>;

/// Await a port call, failing with [`ComposeError::Timeout`] once `limit` elapses.
pub(crate) async fn bounded<T>(
    limit: Duration,
    call: &str,
    future: PortFuture<'_, T>,
) -> Result<T, ComposeError> {
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| ComposeError::Timeout(format!("{call} exceeded {limit:?}")))?
}

/// Serde helper storing binary payloads as base64 text in cassettes.
pub(crate) mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
