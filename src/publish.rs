//! Writes generated artifacts to object storage and mints retrieval URLs.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::error::ComposeError;
use crate::model::{GeneratedArtifact, PublishedArtifactRef};
use crate::ports::{bounded, ObjectStore};

/// Key prefix every artifact is stored under.
pub const KEY_PREFIX: &str = "generated-images";

/// How long a retrieval URL stays valid.
pub const URL_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Build a storage key from an issue time and a random suffix.
///
/// `2024-05-01T12:30:45.123Z` with suffix `0xab` becomes
/// `generated-images/2024-05-01T12-30-45-123Z-00000000000000ab.jpg`.
#[must_use]
pub fn storage_key(issued_at: DateTime<Utc>, suffix: u64) -> String {
    let timestamp =
        issued_at.to_rfc3339_opts(SecondsFormat::Millis, true).replace([':', '.'], "-");
    format!("{KEY_PREFIX}/{timestamp}-{suffix:016x}.jpg")
}

/// Store `artifact` and return a reference valid for [`URL_TTL`].
///
/// A write without a usable retrieval URL is reported as a failure.
///
/// # Errors
///
/// Returns [`ComposeError::Publish`] if the write or the URL minting fails,
/// and [`ComposeError::Timeout`] if either runs past `limit`.
pub async fn publish(
    store: &dyn ObjectStore,
    artifact: GeneratedArtifact,
    limit: Duration,
) -> Result<PublishedArtifactRef, ComposeError> {
    let issued_at = Utc::now();
    let key = storage_key(issued_at, rand::random());

    bounded(limit, "put", store.put(&key, artifact.bytes(), GeneratedArtifact::CONTENT_TYPE))
        .await
        .map_err(|e| e.within(ComposeError::Publish))?;
    let url = bounded(limit, "presign", store.presign_get(&key, URL_TTL))
        .await
        .map_err(|e| e.within(ComposeError::Publish))?;

    info!(key = %key, bytes = artifact.bytes().len(), "artifact published");
    Ok(PublishedArtifactRef {
        storage_key: key,
        retrieval_url: url,
        expires_at: issued_at + chrono::Duration::hours(24),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;
    use crate::test_support::{fake_jpeg, FakeStore};

    fn artifact() -> GeneratedArtifact {
        GeneratedArtifact::from_generated(fake_jpeg("out")).unwrap()
    }

    #[test]
    fn key_replaces_colons_and_dots() {
        let issued = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(
            storage_key(issued, 0xab),
            "generated-images/2024-05-01T12-30-45-123Z-00000000000000ab.jpg"
        );
    }

    #[test]
    fn keys_in_the_same_millisecond_differ_by_suffix() {
        let issued = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let keys: HashSet<String> =
            (0..1000).map(|_| storage_key(issued, rand::random())).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[tokio::test]
    async fn writes_jpeg_and_mints_day_long_url() {
        let store = FakeStore::default();
        let published = publish(&store, artifact(), Duration::from_secs(1)).await.unwrap();

        let objects = store.objects.lock().unwrap();
        assert_eq!(objects.len(), 1);
        let (key, body, content_type) = &objects[0];
        assert_eq!(key, &published.storage_key);
        assert_eq!(body, &fake_jpeg("out"));
        assert_eq!(content_type, "image/jpeg");
        assert!(key.starts_with("generated-images/"));
        assert!(key.ends_with(".jpg"));

        assert_eq!(store.expiries.lock().unwrap().as_slice(), &[URL_TTL]);
        assert!(published.retrieval_url.contains(&published.storage_key));
        assert!(published.expires_at - Utc::now() > chrono::Duration::hours(23));
    }

    #[tokio::test]
    async fn failed_write_is_a_publish_error() {
        let store = FakeStore::failing_put();
        let err = publish(&store, artifact(), Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ComposeError::Publish(_)));
        assert!(store.expiries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_presign_is_a_publish_error() {
        let store = FakeStore::failing_presign();
        let err = publish(&store, artifact(), Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ComposeError::Publish(_)));
    }
}
