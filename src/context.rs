//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::adapters::live::http_source::HttpImageSource;
use crate::adapters::live::load_sdk_config;
use crate::adapters::live::rekognition::RekognitionVision;
use crate::adapters::live::s3::S3ObjectStore;
use crate::adapters::live::sagemaker::SageMakerEndpoint;
use crate::adapters::recording::image_source::RecordingImageSource;
use crate::adapters::recording::inference::RecordingInference;
use crate::adapters::recording::object_store::RecordingObjectStore;
use crate::adapters::recording::vision::RecordingVision;
use crate::adapters::recording::SharedRecorder;
use crate::adapters::replaying::image_source::ReplayingImageSource;
use crate::adapters::replaying::inference::ReplayingInference;
use crate::adapters::replaying::object_store::ReplayingObjectStore;
use crate::adapters::replaying::vision::ReplayingVision;
use crate::cassette::config::load_cassette;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::Config;
use crate::error::ComposeError;
use crate::ports::{ImageSource, InferenceEndpoint, ObjectStore, VisionService};

/// Where recording sessions write their cassettes.
pub const CASSETTE_DIR: &str = ".compositor/cassettes";

/// Bundles all port trait objects into a single context.
///
/// Cloning is cheap and shares the same adapters.
#[derive(Clone)]
pub struct ServiceContext {
    /// Image download port.
    pub images: Arc<dyn ImageSource>,
    /// Image analysis port.
    pub vision: Arc<dyn VisionService>,
    /// Generative backend port.
    pub inference: Arc<dyn InferenceEndpoint>,
    /// Artifact storage port.
    pub store: Arc<dyn ObjectStore>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: SharedRecorder,
}

impl RecordingSession {
    /// Write the cassette to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = self.recorder.lock().unwrap_or_else(PoisonError::into_inner);
        let path = recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))?;
        info!(path = %path.display(), interactions = recorder.len(), "cassette written");
        Ok(path)
    }
}

impl ServiceContext {
    /// Create a live context against HTTP origins and AWS.
    ///
    /// # Errors
    ///
    /// Returns an error if no storage bucket is configured.
    pub async fn live(config: &Config) -> Result<Self, ComposeError> {
        let bucket = config.storage_bucket().ok_or(ComposeError::MissingSetting {
            setting: "storage bucket".into(),
            env_var: "COMPOSITOR_BUCKET".into(),
        })?;
        let sdk = load_sdk_config(&config.aws).await;
        let endpoint = config.endpoint_name();
        info!(
            endpoint = %endpoint,
            bucket = %bucket,
            region = ?sdk.region(),
            "live services configured"
        );

        Ok(Self {
            images: Arc::new(HttpImageSource::new()),
            vision: Arc::new(RekognitionVision::new(&sdk)),
            inference: Arc::new(SageMakerEndpoint::new(&sdk, endpoint)),
            store: Arc::new(S3ObjectStore::new(&sdk, bucket)),
        })
    }

    /// Create a recording context that wraps the live adapters.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be created.
    pub async fn recording(config: &Config) -> Result<(Self, RecordingSession), ComposeError> {
        let live = Self::live(config).await?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(CASSETTE_DIR).join(&timestamp).join("session.cassette.yaml");
        let recorder: SharedRecorder =
            Arc::new(Mutex::new(CassetteRecorder::new(path, timestamp, get_commit_hash())));

        let ctx = Self {
            images: Arc::new(RecordingImageSource::new(live.images, Arc::clone(&recorder))),
            vision: Arc::new(RecordingVision::new(live.vision, Arc::clone(&recorder))),
            inference: Arc::new(RecordingInference::new(live.inference, Arc::clone(&recorder))),
            store: Arc::new(RecordingObjectStore::new(live.store, Arc::clone(&recorder))),
        };
        Ok((ctx, RecordingSession { recorder }))
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, ComposeError> {
        let replayer = load_cassette(path)
            .map_err(|e| ComposeError::Config(format!("Failed to load cassette: {e}")))?;
        info!(path = %path.display(), interactions = replayer.remaining(), "replaying cassette");
        let replayer = Arc::new(Mutex::new(replayer));
        Ok(Self {
            images: Arc::new(ReplayingImageSource::new(Arc::clone(&replayer))),
            vision: Arc::new(ReplayingVision::new(Arc::clone(&replayer))),
            inference: Arc::new(ReplayingInference::new(Arc::clone(&replayer))),
            store: Arc::new(ReplayingObjectStore::new(replayer)),
        })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
