use crate::providers::Provider;
use crate::traits::{FetchedImage, ImageFetcher};
use crate::{Error, Result};
use image::RgbaImage;
use image::imageops::FilterType;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// One render call: the payload text and the requested edge length.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub text: String,
    pub pixel_size: u32,
}

impl RenderRequest {
    pub fn new(text: impl Into<String>, pixel_size: u32) -> Self {
        Self {
            text: text.into(),
            pixel_size,
        }
    }
}

/// What a successful render produced.
///
/// `ImageReference` is the degraded-success path: the image exists at the
/// given URL but its pixels are not available for re-export, so the consumer
/// can only display or link it.
#[derive(Debug, Clone)]
pub enum RenderResult {
    Pixels(RgbaImage),
    ImageReference(String),
}

/// Renders QR images by walking an ordered provider chain, racing each fetch
/// against a fixed per-attempt timeout.
///
/// One instance per composition root; all dependencies are injected at
/// construction and calls share no mutable state, so independent renders may
/// run concurrently.
pub struct QrRenderer {
    providers: Vec<Provider>,
    fetcher: Arc<dyn ImageFetcher>,
    attempt_timeout: Duration,
}

impl QrRenderer {
    pub fn new(
        providers: Vec<Provider>,
        fetcher: Arc<dyn ImageFetcher>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            providers,
            fetcher,
            attempt_timeout,
        }
    }

    /// Tries each provider in order until one yields an image.
    ///
    /// Exactly one fetch is in flight at a time. When the timeout wins the
    /// race the fetch future is dropped, so a late completion can never
    /// resolve an outcome that fallback has already decided. The first
    /// provider to succeed (raster or opaque) ends the chain; no provider is
    /// ever retried.
    pub async fn render(&self, request: &RenderRequest) -> Result<RenderResult> {
        let mut attempts = 0usize;
        let mut timeouts = 0usize;
        let mut last_failure: Option<String> = None;

        for provider in &self.providers {
            attempts += 1;
            let url = provider.build_url(&request.text, request.pixel_size);
            debug!(provider = %provider.name, %url, "requesting QR image");

            match timeout(self.attempt_timeout, self.fetcher.fetch(&url)).await {
                Err(_) => {
                    warn!(provider = %provider.name, "attempt timed out, advancing");
                    timeouts += 1;
                }
                Ok(Err(e)) => {
                    warn!(provider = %provider.name, error = %e, "provider failed, advancing");
                    last_failure = Some(e.to_string());
                }
                Ok(Ok(FetchedImage::Raster(image))) => {
                    debug!(provider = %provider.name, "pixels obtained");
                    return Ok(RenderResult::Pixels(fit_to_size(image, request.pixel_size)));
                }
                Ok(Ok(FetchedImage::Opaque)) => {
                    debug!(provider = %provider.name, "pixel access unavailable, returning reference");
                    return Ok(RenderResult::ImageReference(url));
                }
            }
        }

        // A single-provider chain reports its own reason; a longer chain that
        // only ever timed out reports Timeout; everything else is exhaustion.
        if attempts == 1 {
            return Err(if timeouts == 1 {
                Error::Timeout
            } else {
                Error::Fetch(last_failure.unwrap_or_else(|| "provider failed".into()))
            });
        }
        if attempts > 0 && timeouts == attempts {
            return Err(Error::Timeout);
        }
        Err(Error::ProvidersExhausted(match attempts {
            0 => "no providers configured".into(),
            n => format!("{n} providers failed ({timeouts} timed out)"),
        }))
    }
}

/// Providers do not always honor the requested size exactly; the consumer is
/// promised a `pixel_size` square buffer, so rescale when they differ.
fn fit_to_size(image: RgbaImage, size: u32) -> RgbaImage {
    if image.width() == size && image.height() == size {
        image
    } else {
        image::imageops::resize(&image, size, size, FilterType::Nearest)
    }
}
