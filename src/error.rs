//! Unified error type for the composition pipeline.

use thiserror::Error;

/// Errors that can occur while composing an image.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The incoming request is malformed or incomplete.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// A referenced image could not be fetched.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The vision service rejected or failed an analysis call.
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// The generative backend failed or returned no usable image.
    #[error("Generation error: {0}")]
    Generation(String),

    /// Writing the artifact or minting its retrieval URL failed.
    #[error("Publish error: {0}")]
    Publish(String),

    /// An outbound call or the whole request exceeded its time budget.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// A setting required by the live services is not configured.
    #[error("No {setting} configured. Set {env_var} or add it to config file.")]
    MissingSetting {
        /// The setting name.
        setting: String,
        /// The environment variable name.
        env_var: String,
    },
}

impl ComposeError {
    /// Whether the caller, rather than the service, is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The message without its category prefix.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Validation(m)
            | Self::Fetch(m)
            | Self::Analysis(m)
            | Self::Generation(m)
            | Self::Publish(m)
            | Self::Timeout(m)
            | Self::Config(m) => m.clone(),
            other => other.to_string(),
        }
    }

    /// Re-label an error raised inside a pipeline stage as that stage's
    /// error, keeping timeouts and errors already labelled by a stage.
    #[must_use]
    pub fn within(self, stage: fn(String) -> Self) -> Self {
        match self {
            Self::Timeout(_) | Self::Generation(_) | Self::Publish(_) => self,
            other => stage(other.to_string()),
        }
    }
}
