//! Replaying adapter for the `ObjectStore` port.

use std::time::Duration;

use serde_json::json;

use super::{replay, SharedReplayer};
use crate::cassette::fingerprint;
use crate::error::ComposeError;
use crate::ports::{ObjectStore, PortFuture};

/// Serves recorded storage calls.
///
/// Keys carry a timestamp and a random suffix, so replayed calls usually
/// fall back to recording order rather than matching on input.
pub struct ReplayingObjectStore {
    replayer: SharedReplayer,
}

impl ReplayingObjectStore {
    /// Replay from `replayer`.
    #[must_use]
    pub fn new(replayer: SharedReplayer) -> Self {
        Self { replayer }
    }
}

impl ObjectStore for ReplayingObjectStore {
    fn put(&self, key: &str, body: &[u8], content_type: &str) -> PortFuture<'_, ()> {
        let input = json!({ "key": key, "content_type": content_type, "body": fingerprint(body) });
        let result: Result<(), _> =
            replay(&self.replayer, "object_store", "put", &input, ComposeError::Publish);
        Box::pin(async move { result })
    }

    fn presign_get(&self, key: &str, expires_in: Duration) -> PortFuture<'_, String> {
        let input = json!({ "key": key, "expires_in_secs": expires_in.as_secs() });
        let result: Result<String, _> =
            replay(&self.replayer, "object_store", "presign_get", &input, ComposeError::Publish);
        Box::pin(async move { result })
    }
}
