use async_trait::async_trait;
use image::RgbaImage;

// The capability seam between the renderer and the host's image loading.

/// What a fetch attempt yielded.
///
/// `Opaque` is the degraded path: the provider answered with an image, but
/// pixel-level access is unavailable (the body could not be decoded into a
/// raster). It is a success, never an error; the renderer turns it into a
/// plain image reference.
#[derive(Debug, Clone)]
pub enum FetchedImage {
    Raster(RgbaImage),
    Opaque,
}

/// Image loading capability supplied by the host environment.
///
/// Implementations signal transport and HTTP failures through `Error::Fetch`;
/// a slow implementation is handled by the renderer's per-attempt timeout,
/// not by the fetcher itself.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> crate::Result<FetchedImage>;
}
