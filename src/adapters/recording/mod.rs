//! Recording adapters: delegate to a live adapter and capture each call.

pub mod image_source;
pub mod inference;
pub mod object_store;
pub mod vision;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::cassette::recorder::CassetteRecorder;
use crate::error::ComposeError;

/// Shared handle adapters record into.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Record a call outcome using the `Ok`/`Err` convention.
pub(crate) fn record_result<T: Serialize>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: Value,
    result: &Result<T, ComposeError>,
) {
    let output = match result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(inner) => json!({ "Ok": inner }),
            Err(e) => {
                warn!(port, method, error = %e, "output not recordable; skipping");
                return;
            }
        },
        Err(e) => json!({ "Err": e.detail() }),
    };

    recorder.lock().unwrap_or_else(PoisonError::into_inner).record(port, method, input, output);
}
