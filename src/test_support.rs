//! In-memory port fakes for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::context::ServiceContext;
use crate::error::ComposeError;
use crate::ports::vision::DetectedLabel;
use crate::ports::{
    FetchedImage, GenerationRequest, ImageSource, InferenceEndpoint, InferencePayload,
    ObjectStore, PortFuture, VisionQuery, VisionReport, VisionService,
};

/// Smallest byte sequence `image::guess_format` accepts as JPEG, tagged so
/// fakes can tell images apart.
pub(crate) fn fake_jpeg(tag: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(tag.as_bytes());
    bytes
}

pub(crate) fn labels(names: &[&str]) -> VisionReport {
    VisionReport {
        labels: names
            .iter()
            .map(|n| DetectedLabel { name: (*n).to_string(), confidence: 99.0 })
            .collect(),
        faces: Vec::new(),
    }
}

/// Serves images keyed by URL; unknown URLs fail.
#[derive(Default)]
pub(crate) struct FakeImageSource {
    images: HashMap<String, Vec<u8>>,
    pub(crate) calls: AtomicUsize,
}

impl FakeImageSource {
    pub(crate) fn with(mut self, url: &str, data: Vec<u8>) -> Self {
        self.images.insert(url.to_string(), data);
        self
    }
}

impl ImageSource for FakeImageSource {
    fn fetch(&self, url: &str) -> PortFuture<'_, FetchedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .images
            .get(url)
            .cloned()
            .map(|data| FetchedImage { data })
            .ok_or_else(|| ComposeError::Fetch(format!("{url} unreachable")));
        Box::pin(async move { result })
    }
}

/// Returns a report keyed by image bytes; unknown bytes fail.
#[derive(Default)]
pub(crate) struct FakeVision {
    reports: HashMap<Vec<u8>, VisionReport>,
    delay: Option<Duration>,
    pub(crate) calls: AtomicUsize,
}

impl FakeVision {
    pub(crate) fn with(mut self, image: Vec<u8>, report: VisionReport) -> Self {
        self.reports.insert(image, report);
        self
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl VisionService for FakeVision {
    fn analyze(&self, image: &[u8], _query: VisionQuery) -> PortFuture<'_, VisionReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .reports
            .get(image)
            .cloned()
            .ok_or_else(|| ComposeError::Analysis("unrecognized image".into()));
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}

/// Replies with a fixed body (or error) and remembers the last request.
pub(crate) struct FakeInference {
    reply: Result<Vec<u8>, String>,
    pub(crate) last_request: Mutex<Option<GenerationRequest>>,
    pub(crate) calls: AtomicUsize,
}

impl FakeInference {
    pub(crate) fn replying(body: impl Into<Vec<u8>>) -> Self {
        Self { reply: Ok(body.into()), last_request: Mutex::new(None), calls: AtomicUsize::new(0) }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            last_request: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }
}

impl InferenceEndpoint for FakeInference {
    fn invoke(&self, request: &GenerationRequest) -> PortFuture<'_, InferencePayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        let result = self
            .reply
            .clone()
            .map(|body| InferencePayload { body })
            .map_err(ComposeError::Generation);
        Box::pin(async move { result })
    }
}

/// Keeps written objects in memory and mints `memory://` URLs.
#[derive(Default)]
pub(crate) struct FakeStore {
    pub(crate) objects: Mutex<Vec<(String, Vec<u8>, String)>>,
    pub(crate) expiries: Mutex<Vec<Duration>>,
    fail_put: bool,
    fail_presign: bool,
}

impl FakeStore {
    pub(crate) fn failing_put() -> Self {
        Self { fail_put: true, ..Self::default() }
    }

    pub(crate) fn failing_presign() -> Self {
        Self { fail_presign: true, ..Self::default() }
    }
}

impl ObjectStore for FakeStore {
    fn put(&self, key: &str, body: &[u8], content_type: &str) -> PortFuture<'_, ()> {
        let result = if self.fail_put {
            Err(ComposeError::Publish("access denied".into()))
        } else {
            self.objects.lock().unwrap().push((
                key.to_string(),
                body.to_vec(),
                content_type.to_string(),
            ));
            Ok(())
        };
        Box::pin(async move { result })
    }

    fn presign_get(&self, key: &str, expires_in: Duration) -> PortFuture<'_, String> {
        let result = if self.fail_presign {
            Err(ComposeError::Publish("signing failed".into()))
        } else {
            self.expiries.lock().unwrap().push(expires_in);
            Ok(format!("memory://{key}?expires={}", expires_in.as_secs()))
        };
        Box::pin(async move { result })
    }
}

/// Port handles plus typed access to the fakes behind them.
pub(crate) struct Fakes {
    pub(crate) images: Arc<FakeImageSource>,
    pub(crate) vision: Arc<FakeVision>,
    pub(crate) inference: Arc<FakeInference>,
    pub(crate) store: Arc<FakeStore>,
}

impl Fakes {
    pub(crate) fn new(
        images: FakeImageSource,
        vision: FakeVision,
        inference: FakeInference,
        store: FakeStore,
    ) -> Self {
        Self {
            images: Arc::new(images),
            vision: Arc::new(vision),
            inference: Arc::new(inference),
            store: Arc::new(store),
        }
    }

    pub(crate) fn context(&self) -> ServiceContext {
        ServiceContext {
            images: self.images.clone(),
            vision: self.vision.clone(),
            inference: self.inference.clone(),
            store: self.store.clone(),
        }
    }
}
