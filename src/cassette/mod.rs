//! Cassettes: recorded port traffic for offline, deterministic runs.
//!
//! A recording session wraps the live adapters and captures every call; a
//! replaying session serves those calls back without touching the network.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;

use sha2::{Digest, Sha256};

/// Stand-in for a binary payload in a cassette input: its length and
/// SHA-256, so large images are matched without being stored twice.
#[must_use]
pub fn fingerprint(bytes: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "len": bytes.len(),
        "sha256": format!("{:x}", Sha256::digest(bytes)),
    })
}
