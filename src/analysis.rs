//! Visual analysis: fetch an input image and summarize what the vision
//! service sees in it.
//!
//! Analysis is best-effort. Any failure along a chain (unreachable URL,
//! non-image body, vision service error, timeout) degrades that chain to
//! [`ImageAnalysis::default`] and is only visible in the logs.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ComposeError;
use crate::model::{AgeRange, Demographics, ImageAnalysis, ImageRole};
use crate::ports::vision::DetectedFace;
use crate::ports::{bounded, ImageSource, VisionQuery, VisionReport, VisionService};

/// Labels below this confidence (percent) are dropped.
pub const MIN_LABEL_CONFIDENCE: f32 = 70.0;

/// At most this many labels are kept per image.
pub const MAX_LABELS: u32 = 10;

/// At most this many emotions are surfaced per face.
pub const MAX_EMOTIONS: usize = 3;

/// Thresholds sent along with every vision call.
pub const QUERY: VisionQuery = VisionQuery {
    min_confidence: MIN_LABEL_CONFIDENCE,
    max_labels: MAX_LABELS,
};

/// Time budgets for one analysis chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainTimeouts {
    /// Budget for the fetch.
    pub fetch: Duration,
    /// Budget for the vision call.
    pub analyze: Duration,
}

/// Run one fetch-then-analyze chain. Never fails.
pub async fn analyze_image(
    source: &dyn ImageSource,
    vision: &dyn VisionService,
    role: ImageRole,
    url: &str,
    timeouts: ChainTimeouts,
) -> ImageAnalysis {
    match try_analyze(source, vision, url, timeouts).await {
        Ok(analysis) => {
            debug!(
                role = role.as_str(),
                labels = analysis.labels.len(),
                faces = analysis.face_count,
                "analysis complete"
            );
            analysis
        }
        Err(e) => {
            warn!(role = role.as_str(), url, error = %e, "analysis degraded to empty");
            ImageAnalysis::default()
        }
    }
}

async fn try_analyze(
    source: &dyn ImageSource,
    vision: &dyn VisionService,
    url: &str,
    timeouts: ChainTimeouts,
) -> Result<ImageAnalysis, ComposeError> {
    let image = bounded(timeouts.fetch, "fetch", source.fetch(url)).await?;
    let report = bounded(timeouts.analyze, "analyze", vision.analyze(&image.data, QUERY)).await?;
    Ok(summarize(&report))
}

/// Reduce a raw vision report to the fields the prompt needs.
///
/// Only the first detected face contributes demographics; additional faces
/// are counted but otherwise ignored.
#[must_use]
pub fn summarize(report: &VisionReport) -> ImageAnalysis {
    let labels = report
        .labels
        .iter()
        .filter(|l| l.confidence >= MIN_LABEL_CONFIDENCE)
        .take(MAX_LABELS as usize)
        .map(|l| l.name.to_lowercase())
        .collect();

    ImageAnalysis {
        labels,
        face_count: u32::try_from(report.faces.len()).unwrap_or(u32::MAX),
        demographics: report.faces.first().and_then(demographics),
    }
}

fn demographics(face: &DetectedFace) -> Option<Demographics> {
    let (low, high) = (face.age_low?, face.age_high?);

    let mut emotions: Vec<_> = face.emotions.iter().collect();
    // sort_by is stable: ties keep service order
    emotions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    Some(Demographics {
        age_range: AgeRange { low: low.min(high), high: low.max(high) },
        gender: face.gender.as_ref().map(|g| g.to_lowercase()),
        top_emotions: emotions
            .into_iter()
            .take(MAX_EMOTIONS)
            .map(|e| e.name.to_lowercase())
            .collect(),
    })
}
