//! Object storage port: durable writes and time-bounded read URLs.

use std::time::Duration;

use super::PortFuture;

/// Durable object storage.
pub trait ObjectStore: Send + Sync {
    /// Write `body` under `key` with the given content type.
    fn put(&self, key: &str, body: &[u8], content_type: &str) -> PortFuture<'_, ()>;

    /// Mint a read-only URL for `key` that expires after `expires_in`.
    fn presign_get(&self, key: &str, expires_in: Duration) -> PortFuture<'_, String>;
}
