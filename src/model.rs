//! Request, analysis and artifact types shared across the pipeline.

use std::io::Cursor;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ComposeError;

/// The role an input image plays in the composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    /// The subject to depict.
    Person,
    /// The outfit the subject wears.
    Clothing,
    /// The scene the subject stands in.
    Place,
}

impl ImageRole {
    /// Lower-case name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Clothing => "clothing",
            Self::Place => "place",
        }
    }
}

/// A validated request to compose a person, clothing and place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRequest {
    /// URL of the person image.
    pub person_image: String,
    /// URLs of clothing images; only the first one is analyzed.
    pub clothing_images: Vec<String>,
    /// URL of the place image.
    pub place_image: String,
}

/// Wire shape of the request body before required fields are checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompositionRequest {
    person_image: Option<String>,
    clothing_images: Option<Vec<String>>,
    place_image: Option<String>,
}

impl CompositionRequest {
    /// Parse and validate a JSON request body.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Validation`] if the body is not JSON, a
    /// required field is missing, or a URL is unusable.
    pub fn from_json(body: &[u8]) -> Result<Self, ComposeError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ComposeError::Validation("request body is empty".into()));
        }
        let raw: RawCompositionRequest = serde_json::from_slice(body)
            .map_err(|e| ComposeError::Validation(format!("malformed JSON body: {e}")))?;

        let request = Self {
            person_image: raw.person_image.ok_or_else(|| missing("personImage"))?,
            clothing_images: raw.clothing_images.ok_or_else(|| missing("clothingImages"))?,
            place_image: raw.place_image.ok_or_else(|| missing("placeImage"))?,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the invariants of a request built in code.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Validation`] if `clothing_images` is empty or
    /// any reference is not an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ComposeError> {
        if self.clothing_images.is_empty() {
            return Err(ComposeError::Validation(
                "clothingImages must contain at least one URL".into(),
            ));
        }
        validate_url("personImage", &self.person_image)?;
        for url in &self.clothing_images {
            validate_url("clothingImages", url)?;
        }
        validate_url("placeImage", &self.place_image)
    }

    /// The clothing image that gets analyzed.
    #[must_use]
    pub fn primary_clothing(&self) -> &str {
        self.clothing_images.first().map_or("", String::as_str)
    }
}

fn missing(field: &str) -> ComposeError {
    ComposeError::Validation(format!("{field} is required"))
}

fn validate_url(field: &str, value: &str) -> Result<(), ComposeError> {
    let parsed = Url::parse(value.trim())
        .map_err(|e| ComposeError::Validation(format!("{field} is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ComposeError::Validation(format!(
            "{field} must use http or https, got '{other}'"
        ))),
    }
}

/// Visual signal extracted from one input image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    /// Lower-cased labels in service order.
    pub labels: Vec<String>,
    /// Number of detected faces.
    pub face_count: u32,
    /// Demographics of the first detected face.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographics: Option<Demographics>,
}

/// Estimated demographics of a single face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    /// Estimated age bounds.
    pub age_range: AgeRange,
    /// Lower-cased gender, when the service reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Up to three lower-cased emotions, most confident first.
    pub top_emotions: Vec<String>,
}

/// Inclusive age bounds in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    /// Lower bound.
    pub low: u32,
    /// Upper bound.
    pub high: u32,
}

impl AgeRange {
    /// Midpoint of the range, rounded half up.
    #[must_use]
    pub fn midpoint(self) -> u32 {
        let sum = u64::from(self.low) + u64::from(self.high);
        u32::try_from(sum.div_ceil(2)).unwrap_or(u32::MAX)
    }
}

/// The three analyses gathered for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompositionAnalysis {
    /// Analysis of the person image.
    pub person: ImageAnalysis,
    /// Analysis of the first clothing image.
    pub clothing: ImageAnalysis,
    /// Analysis of the place image.
    pub place: ImageAnalysis,
}

/// Image bytes ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    bytes: Vec<u8>,
}

impl GeneratedArtifact {
    /// Content type every published artifact is stored with.
    pub const CONTENT_TYPE: &'static str = "image/jpeg";

    /// Normalize generated bytes to JPEG.
    ///
    /// JPEG data is kept as-is; any other recognized image format is
    /// transcoded.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Generation`] if the bytes are not an image.
    pub fn from_generated(bytes: Vec<u8>) -> Result<Self, ComposeError> {
        let format = image::guess_format(&bytes).map_err(|e| {
            ComposeError::Generation(format!("generated payload is not an image: {e}"))
        })?;
        if format == image::ImageFormat::Jpeg {
            return Ok(Self { bytes });
        }

        let decoded = image::load_from_memory_with_format(&bytes, format).map_err(|e| {
            ComposeError::Generation(format!("failed to decode generated {format:?}: {e}"))
        })?;
        let mut out = Cursor::new(Vec::new());
        decoded
            .to_rgb8()
            .write_to(&mut out, image::ImageFormat::Jpeg)
            .map_err(|e| ComposeError::Generation(format!("failed to encode JPEG: {e}")))?;
        Ok(Self { bytes: out.into_inner() })
    }

    /// The JPEG bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the artifact, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Where a published artifact lives and how to retrieve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedArtifactRef {
    /// Object storage key.
    pub storage_key: String,
    /// Time-bounded retrieval URL.
    pub retrieval_url: String,
    /// When the retrieval URL stops being valid.
    pub expires_at: DateTime<Utc>,
}

/// Success payload returned to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionResponse {
    /// Retrieval URL of the composite image.
    pub image_url: String,
    /// Always `"success"`.
    pub status: &'static str,
    /// Human-readable summary.
    pub message: String,
    /// The prompt the image was generated from.
    pub prompt: String,
    /// The analyses the prompt was synthesized from.
    pub analysis: CompositionAnalysis,
    /// The request as received.
    pub inputs: CompositionRequest,
}

/// Failure payload returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// The underlying error message.
    pub error: String,
    /// Always `"error"`.
    pub status: &'static str,
}

impl From<&ComposeError> for ErrorResponse {
    fn from(err: &ComposeError) -> Self {
        Self { error: err.to_string(), status: "error" }
    }
}
