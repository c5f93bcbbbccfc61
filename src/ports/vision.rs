//! Vision port: label and face detection over raw image bytes.

use serde::{Deserialize, Serialize};

use super::PortFuture;

/// Thresholds passed to the vision service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionQuery {
    /// Minimum label confidence, in percent.
    pub min_confidence: f32,
    /// Maximum number of labels to return.
    pub max_labels: u32,
}

/// Everything the vision service detected in one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionReport {
    /// Labels in the order the service returned them.
    #[serde(default)]
    pub labels: Vec<DetectedLabel>,
    /// Faces in the order the service returned them.
    #[serde(default)]
    pub faces: Vec<DetectedFace>,
}

/// A single detected label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLabel {
    /// Label name as reported (any case).
    pub name: String,
    /// Confidence, in percent.
    pub confidence: f32,
}

/// Attributes of a single detected face.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    /// Lower bound of the estimated age.
    #[serde(default)]
    pub age_low: Option<u32>,
    /// Upper bound of the estimated age.
    #[serde(default)]
    pub age_high: Option<u32>,
    /// Estimated gender (any case).
    #[serde(default)]
    pub gender: Option<String>,
    /// Emotions in the order the service returned them.
    #[serde(default)]
    pub emotions: Vec<DetectedEmotion>,
}

/// A single emotion estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEmotion {
    /// Emotion name (any case).
    pub name: String,
    /// Confidence, in percent.
    pub confidence: f32,
}

/// Runs computer-vision analysis over image bytes.
pub trait VisionService: Send + Sync {
    /// Detect labels and faces in `image`.
    fn analyze(&self, image: &[u8], query: VisionQuery) -> PortFuture<'_, VisionReport>;
}
