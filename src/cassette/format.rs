//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session: every port call made while it ran, in call order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Session name, usually the recording timestamp.
    pub name: String,
    /// When the cassette was written.
    pub recorded_at: DateTime<Utc>,
    /// Commit the recording was made from.
    pub commit: String,
    /// Recorded calls.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// One port call and its outcome.
///
/// `output` holds either `{"Ok": value}` or `{"Err": message}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the session.
    pub seq: u64,
    /// Port name, such as `vision`.
    pub port: String,
    /// Method name, such as `analyze`.
    pub method: String,
    /// What the call was made with.
    pub input: serde_json::Value,
    /// What the call returned.
    pub output: serde_json::Value,
}
