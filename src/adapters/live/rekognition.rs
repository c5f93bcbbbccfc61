//! Live adapter for Amazon Rekognition.

use aws_config::SdkConfig;
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::{Attribute, FaceDetail, Image, Label};
use aws_sdk_rekognition::Client;

use crate::error::ComposeError;
use crate::ports::vision::{DetectedEmotion, DetectedFace, DetectedLabel};
use crate::ports::{PortFuture, VisionQuery, VisionReport, VisionService};

/// Runs label and face detection on inline image bytes.
pub struct RekognitionVision {
    client: Client,
}

impl RekognitionVision {
    /// Create a client from shared AWS settings.
    #[must_use]
    pub fn new(sdk: &SdkConfig) -> Self {
        Self { client: Client::new(sdk) }
    }
}

impl VisionService for RekognitionVision {
    fn analyze(&self, image: &[u8], query: VisionQuery) -> PortFuture<'_, VisionReport> {
        let image = Image::builder().bytes(Blob::new(image.to_vec())).build();
        Box::pin(async move {
            let labels = self
                .client
                .detect_labels()
                .image(image.clone())
                .max_labels(i32::try_from(query.max_labels).unwrap_or(i32::MAX))
                .min_confidence(query.min_confidence)
                .send();
            let faces = self.client.detect_faces().image(image).attributes(Attribute::All).send();

            let (labels, faces) = tokio::join!(labels, faces);
            let labels = labels.map_err(|e| {
                ComposeError::Analysis(format!("detect_labels: {}", DisplayErrorContext(&e)))
            })?;
            let faces = faces.map_err(|e| {
                ComposeError::Analysis(format!("detect_faces: {}", DisplayErrorContext(&e)))
            })?;

            Ok(VisionReport {
                labels: labels.labels().iter().filter_map(label).collect(),
                faces: faces.face_details().iter().map(face).collect(),
            })
        })
    }
}

fn label(label: &Label) -> Option<DetectedLabel> {
    Some(DetectedLabel {
        name: label.name()?.to_string(),
        confidence: label.confidence().unwrap_or_default(),
    })
}

fn face(detail: &FaceDetail) -> DetectedFace {
    let age = detail.age_range();
    DetectedFace {
        age_low: age.and_then(|a| a.low()).and_then(|v| u32::try_from(v).ok()),
        age_high: age.and_then(|a| a.high()).and_then(|v| u32::try_from(v).ok()),
        gender: detail
            .gender()
            .and_then(|g| g.value())
            .map(|g| g.as_str().to_string()),
        emotions: detail
            .emotions()
            .iter()
            .filter_map(|e| {
                Some(DetectedEmotion {
                    name: e.r#type()?.as_str().to_string(),
                    confidence: e.confidence().unwrap_or_default(),
                })
            })
            .collect(),
    }
}
