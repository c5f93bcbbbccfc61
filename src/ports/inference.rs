//! Inference port: invoke the generative image backend.

use serde::{Deserialize, Serialize};

use super::{base64_bytes, PortFuture};

/// Body sent to the generative backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The synthesized prompt.
    pub prompt: String,
    /// URL of the person image.
    pub person_image: String,
    /// URLs of the clothing images.
    pub clothing_images: Vec<String>,
    /// URL of the place image.
    pub place_image: String,
    /// Number of denoising steps.
    pub num_inference_steps: u32,
    /// Classifier-free guidance scale.
    pub guidance_scale: f32,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

/// Opaque response body returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferencePayload {
    /// The raw body bytes.
    #[serde(with = "base64_bytes")]
    pub body: Vec<u8>,
}

/// Invokes a deployed generative model.
pub trait InferenceEndpoint: Send + Sync {
    /// Send `request` and return the raw response body.
    fn invoke(&self, request: &GenerationRequest) -> PortFuture<'_, InferencePayload>;
}
