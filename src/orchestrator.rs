//! Drives one composition request from validation to a published image.
//!
//! ```text
//! Received -> Validating -> Analyzing (x3, concurrent) -> PromptReady
//!          -> Generating -> Publishing -> Completed
//! ```
//!
//! Any stage may end in failure. Validation failures are client errors;
//! generation and publish failures are server errors; the analysis stage
//! cannot fail the request.

use std::fmt;

use tracing::{debug, error, info};

use crate::analysis::{analyze_image, ChainTimeouts};
use crate::config::{Config, TimeoutsConfig};
use crate::context::ServiceContext;
use crate::error::ComposeError;
use crate::generation::{generate, GenerationParams};
use crate::model::{
    CompositionAnalysis, CompositionRequest, CompositionResponse, GeneratedArtifact, ImageRole,
};
use crate::prompt::synthesize;
use crate::publish::publish;

/// Read-only settings shared by every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    /// Parameters sent with every generation call.
    pub generation: GenerationParams,
    /// Deadline for a whole request.
    pub request_timeout: std::time::Duration,
    /// Budgets for each analysis chain.
    pub chain_timeouts: ChainTimeouts,
    /// Budget for the generation call.
    pub generate_timeout: std::time::Duration,
    /// Budget for each storage call.
    pub publish_timeout: std::time::Duration,
}

impl PipelineSettings {
    /// Derive settings from loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(GenerationParams::from(&config.generation), &config.timeouts)
    }

    fn new(generation: GenerationParams, timeouts: &TimeoutsConfig) -> Self {
        Self {
            generation,
            request_timeout: timeouts.request(),
            chain_timeouts: ChainTimeouts { fetch: timeouts.fetch(), analyze: timeouts.analyze() },
            generate_timeout: timeouts.generate(),
            publish_timeout: timeouts.publish(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::new(GenerationParams::default(), &TimeoutsConfig::default())
    }
}

/// Pipeline stages, used to tag failures in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validating,
    Generating,
    Publishing,
    Deadline,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validating => "validating",
            Self::Generating => "generating",
            Self::Publishing => "publishing",
            Self::Deadline => "deadline",
        })
    }
}

/// Runs composition requests against a set of port handles.
#[derive(Clone)]
pub struct Orchestrator {
    ctx: ServiceContext,
    settings: PipelineSettings,
}

impl Orchestrator {
    /// Create an orchestrator over the given ports.
    #[must_use]
    pub fn new(ctx: ServiceContext, settings: PipelineSettings) -> Self {
        Self { ctx, settings }
    }

    /// Parse a JSON request body and compose it.
    ///
    /// # Errors
    ///
    /// See [`Orchestrator::compose`].
    pub async fn handle_json(&self, body: &[u8]) -> Result<CompositionResponse, ComposeError> {
        let request =
            CompositionRequest::from_json(body).map_err(|e| failed(Stage::Validating, e))?;
        self.compose(request).await
    }

    /// Compose one request.
    ///
    /// Validation runs before any outbound call.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::Validation`] for a bad request,
    /// [`ComposeError::Generation`] or [`ComposeError::Publish`] when those
    /// stages fail, and [`ComposeError::Timeout`] when a budget is exceeded.
    pub async fn compose(
        &self,
        request: CompositionRequest,
    ) -> Result<CompositionResponse, ComposeError> {
        request.validate().map_err(|e| failed(Stage::Validating, e))?;

        let limit = self.settings.request_timeout;
        tokio::time::timeout(limit, self.run(request)).await.map_err(|_| {
            failed(Stage::Deadline, ComposeError::Timeout(format!("request exceeded {limit:?}")))
        })?
    }

    async fn run(&self, request: CompositionRequest) -> Result<CompositionResponse, ComposeError> {
        info!(
            person = %request.person_image,
            clothing = request.clothing_images.len(),
            place = %request.place_image,
            "composition received"
        );

        let (person, clothing, place) = tokio::join!(
            self.analyze(ImageRole::Person, &request.person_image),
            self.analyze(ImageRole::Clothing, request.primary_clothing()),
            self.analyze(ImageRole::Place, &request.place_image),
        );
        let analysis = CompositionAnalysis { person, clothing, place };

        let prompt = synthesize(&analysis);
        debug!(prompt = %prompt, "prompt ready");

        let bytes = generate(
            self.ctx.inference.as_ref(),
            &prompt,
            &request,
            &self.settings.generation,
            self.settings.generate_timeout,
        )
        .await
        .map_err(|e| failed(Stage::Generating, e))?;
        let artifact =
            GeneratedArtifact::from_generated(bytes).map_err(|e| failed(Stage::Generating, e))?;

        let published =
            publish(self.ctx.store.as_ref(), artifact, self.settings.publish_timeout)
                .await
                .map_err(|e| failed(Stage::Publishing, e))?;

        info!(
            key = %published.storage_key,
            expires_at = %published.expires_at,
            "composition completed"
        );
        Ok(CompositionResponse {
            image_url: published.retrieval_url,
            status: "success",
            message: "Image generated successfully".to_string(),
            prompt: prompt.into_string(),
            analysis,
            inputs: request,
        })
    }

    async fn analyze(&self, role: ImageRole, url: &str) -> crate::model::ImageAnalysis {
        analyze_image(
            self.ctx.images.as_ref(),
            self.ctx.vision.as_ref(),
            role,
            url,
            self.settings.chain_timeouts,
        )
        .await
    }
}

fn failed(stage: Stage, err: ComposeError) -> ComposeError {
    if err.is_client_error() {
        info!(%stage, error = %err, "composition rejected");
    } else {
        error!(%stage, error = %err, "composition failed");
    }
    err
}
