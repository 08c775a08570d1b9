use crate::traits::{FetchedImage, ImageFetcher};
use crate::{Error, Result};
use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// One scripted fetch attempt: an optional simulated network delay followed
/// by a fixed outcome.
#[derive(Debug, Clone)]
pub struct MockResponse {
    delay: Duration,
    outcome: MockOutcome,
}

#[derive(Debug, Clone)]
enum MockOutcome {
    Raster(RgbaImage),
    Opaque,
    Fail(String),
}

impl MockResponse {
    pub fn raster(image: RgbaImage) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: MockOutcome::Raster(image),
        }
    }

    pub fn opaque() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: MockOutcome::Opaque,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: MockOutcome::Fail(message.into()),
        }
    }

    /// Delays the outcome, e.g. past the renderer's timeout budget.
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A single-color raster, handy for telling providers apart in assertions.
pub fn solid_raster(size: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(size, size, Rgba(rgba))
}

/// A mock fetcher for testing purposes.
/// It replays a scripted sequence of responses, one per `fetch` call, without
/// any real network interaction.
#[derive(Debug, Default)]
pub struct MockFetcher {
    script: Mutex<VecDeque<MockResponse>>,
    calls: AtomicUsize,
}

impl MockFetcher {
    pub fn with_script(script: impl IntoIterator<Item = MockResponse>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch` calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for MockFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        let Some(response) = next else {
            return Err(Error::Fetch("MockFetcher: no response scripted".into()));
        };

        if !response.delay.is_zero() {
            sleep(response.delay).await;
        }
        match response.outcome {
            MockOutcome::Raster(image) => Ok(FetchedImage::Raster(image)),
            MockOutcome::Opaque => Ok(FetchedImage::Opaque),
            MockOutcome::Fail(message) => Err(Error::Fetch(message)),
        }
    }
}
