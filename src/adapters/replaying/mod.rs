//! Replaying adapters that serve recorded interactions from cassettes.

pub mod image_source;
pub mod inference;
pub mod object_store;
pub mod vision;

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::cassette::replayer::CassetteReplayer;

/// Shared handle adapters replay from.
pub type SharedReplayer = Arc<Mutex<CassetteReplayer>>;

/// Take the recorded output for a call.
pub(crate) fn next_output(
    replayer: &SharedReplayer,
    port: &str,
    method: &str,
    input: &Value,
) -> Result<Value, String> {
    let mut guard = replayer.lock().unwrap_or_else(PoisonError::into_inner);
    guard.next_matching(port, method, input).map(|i| i.output.clone())
}

/// Decode a replayed output as `Result<T, String>`.
///
/// Outputs written without the `Ok`/`Err` wrapper are read as `Ok`.
pub(crate) fn replay_result<T: serde::de::DeserializeOwned>(output: Value) -> Result<T, String> {
    if let Some(err) = output.get("Err") {
        return Err(err.as_str().unwrap_or("replayed error").to_string());
    }
    let value = match output {
        Value::Object(mut map) if map.contains_key("Ok") => map.remove("Ok").unwrap_or_default(),
        other => other,
    };
    serde_json::from_value(value).map_err(|e| format!("recorded output does not decode: {e}"))
}

/// Replay one call, turning every failure into a port error via `fail`.
pub(crate) fn replay<T: serde::de::DeserializeOwned, E>(
    replayer: &SharedReplayer,
    port: &str,
    method: &str,
    input: &Value,
    fail: fn(String) -> E,
) -> Result<T, E> {
    next_output(replayer, port, method, input).and_then(replay_result).map_err(fail)
}
