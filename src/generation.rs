//! Calls the generative backend and pulls image bytes out of its response.
//!
//! The backend's output schema has changed across deployed model versions,
//! so the response is probed by an ordered list of extractors and the first
//! one that finds data wins.

use std::time::Duration;

use base64::Engine;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::error::ComposeError;
use crate::model::CompositionRequest;
use crate::ports::{bounded, GenerationRequest, InferenceEndpoint};
use crate::prompt::GenerationPrompt;

/// Fixed parameters sent with every generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Number of denoising steps.
    pub steps: u32,
    /// Classifier-free guidance scale.
    pub guidance_scale: f32,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for GenerationParams {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            steps: config.steps,
            guidance_scale: config.guidance_scale,
            width: config.width,
            height: config.height,
        }
    }
}

impl GenerationParams {
    /// Assemble the backend request for a prompt and the original inputs.
    #[must_use]
    pub fn request_for(
        &self,
        prompt: &GenerationPrompt,
        inputs: &CompositionRequest,
    ) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.as_str().to_string(),
            person_image: inputs.person_image.clone(),
            clothing_images: inputs.clothing_images.clone(),
            place_image: inputs.place_image.clone(),
            num_inference_steps: self.steps,
            guidance_scale: self.guidance_scale,
            width: self.width,
            height: self.height,
        }
    }
}

/// Invoke the backend and return the decoded image bytes.
///
/// # Errors
///
/// Returns [`ComposeError::Generation`] if the call fails or the response
/// holds no decodable image, and [`ComposeError::Timeout`] if the call runs
/// past `limit`.
pub async fn generate(
    endpoint: &dyn InferenceEndpoint,
    prompt: &GenerationPrompt,
    inputs: &CompositionRequest,
    params: &GenerationParams,
    limit: Duration,
) -> Result<Vec<u8>, ComposeError> {
    let request = params.request_for(prompt, inputs);
    let payload = bounded(limit, "generate", endpoint.invoke(&request))
        .await
        .map_err(|e| e.within(ComposeError::Generation))?;
    let bytes = extract_image(&payload.body)?;
    info!(bytes = bytes.len(), "generation complete");
    Ok(bytes)
}

/// Image data located in a response, before decoding.
#[derive(Debug, PartialEq, Eq)]
enum Located {
    /// Base64 text, possibly behind a `data:` URL prefix.
    Encoded(String),
    /// Binary image data.
    Raw(Vec<u8>),
}

/// A response body, parsed as JSON when it is JSON.
struct ResponseBody<'a> {
    raw: &'a [u8],
    json: Option<Value>,
}

type Extractor = fn(&ResponseBody<'_>) -> Option<Located>;

/// Where image data may live, in the order it is looked for.
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("generated_images", generated_images),
    ("images", images),
    ("generated_image", generated_image),
    ("body", whole_body),
];

/// Locate and decode the image in a raw backend response.
///
/// # Errors
///
/// Returns [`ComposeError::Generation`] with `"no image data found"` if no
/// extractor yields data, or a decode message if the data is not base64.
pub fn extract_image(raw: &[u8]) -> Result<Vec<u8>, ComposeError> {
    let body = ResponseBody { raw, json: serde_json::from_slice(raw).ok() };
    for (source, extract) in EXTRACTORS {
        if let Some(located) = extract(&body) {
            debug!(source, "image data located");
            return decode(located);
        }
    }
    Err(ComposeError::Generation("no image data found".into()))
}

fn generated_images(body: &ResponseBody<'_>) -> Option<Located> {
    first_in_array(body, "generated_images")
}

fn images(body: &ResponseBody<'_>) -> Option<Located> {
    first_in_array(body, "images")
}

fn generated_image(body: &ResponseBody<'_>) -> Option<Located> {
    non_empty(body.json.as_ref()?.get("generated_image")?.as_str()?)
}

fn first_in_array(body: &ResponseBody<'_>, field: &str) -> Option<Located> {
    let first = body.json.as_ref()?.get(field)?.as_array()?.first()?.as_str()?;
    non_empty(first)
}

fn whole_body(body: &ResponseBody<'_>) -> Option<Located> {
    match &body.json {
        Some(Value::String(text)) => non_empty(text),
        // Any other JSON document is structure, not image data
        Some(_) => None,
        None => match std::str::from_utf8(body.raw) {
            Ok(text) => non_empty(text),
            Err(_) => Some(Located::Raw(body.raw.to_vec())),
        },
    }
}

fn non_empty(text: &str) -> Option<Located> {
    let text = text.trim();
    (!text.is_empty()).then(|| Located::Encoded(text.to_string()))
}

fn decode(located: Located) -> Result<Vec<u8>, ComposeError> {
    match located {
        Located::Raw(bytes) => Ok(bytes),
        Located::Encoded(text) => {
            let payload: String =
                strip_data_url(&text).chars().filter(|c| !c.is_ascii_whitespace()).collect();
            base64::engine::general_purpose::STANDARD.decode(payload).map_err(|e| {
                ComposeError::Generation(format!("failed to decode base64 image data: {e}"))
            })
        }
    }
}

/// Drop a leading `data:<mime>;base64,` prefix.
fn strip_data_url(text: &str) -> &str {
    if text.get(..5).is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:")) {
        if let Some((_, rest)) = text.split_once(',') {
            return rest;
        }
    }
    text
}
