//! Recording adapter for the `ObjectStore` port.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::{record_result, SharedRecorder};
use crate::cassette::fingerprint;
use crate::ports::{ObjectStore, PortFuture};

/// Records storage calls while delegating to an inner store.
pub struct RecordingObjectStore {
    inner: Arc<dyn ObjectStore>,
    recorder: SharedRecorder,
}

impl RecordingObjectStore {
    /// Wrap `inner`, recording into `recorder`.
    pub fn new(inner: Arc<dyn ObjectStore>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl ObjectStore for RecordingObjectStore {
    fn put(&self, key: &str, body: &[u8], content_type: &str) -> PortFuture<'_, ()> {
        let input = json!({ "key": key, "content_type": content_type, "body": fingerprint(body) });
        let call = self.inner.put(key, body, content_type);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "object_store", "put", input, &result);
            result
        })
    }

    fn presign_get(&self, key: &str, expires_in: Duration) -> PortFuture<'_, String> {
        let input = json!({ "key": key, "expires_in_secs": expires_in.as_secs() });
        let call = self.inner.presign_get(key, expires_in);
        Box::pin(async move {
            let result = call.await;
            record_result(&self.recorder, "object_store", "presign_get", input, &result);
            result
        })
    }
}
