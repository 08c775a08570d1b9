use crate::traits::{FetchedImage, ImageFetcher};
use crate::{Error, Result};
use async_trait::async_trait;

/// Fetches provider images over HTTP with reqwest.
///
/// Transport errors and non-2xx statuses are reported as `Error::Fetch` so
/// the renderer can advance the fallback chain. A body that loads but cannot
/// be decoded into a raster (SVG, HTML error page served with 200, ...) is
/// the degraded path and yields `FetchedImage::Opaque`.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        match image::load_from_memory(&bytes) {
            Ok(decoded) => Ok(FetchedImage::Raster(decoded.to_rgba8())),
            Err(e) => {
                tracing::debug!("image loaded but pixels are unavailable: {e}");
                Ok(FetchedImage::Opaque)
            }
        }
    }
}
