use crate::Result;
use crate::config::AppConfig;
use crate::renderer::{QrRenderer, RenderRequest, RenderResult};
use crate::wifi::{SecurityMode, WifiCredentials};
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use image::RgbaImage;
use rust_embed::RustEmbed;
use serde::Deserialize;
use std::io::Cursor;
use std::sync::Arc;
use tokio::net::TcpListener;

/// The form UI, embedded into the binary.
#[derive(RustEmbed)]
#[folder = "ui/"]
struct UiAsset;

/// Accepted bounds for the client-supplied pixel size. A render allocates a
/// size × size RGBA buffer, so out-of-range requests are rejected up front.
const MIN_PIXEL_SIZE: u32 = 16;
const MAX_PIXEL_SIZE: u32 = 2048;

/// Web server state. The renderer is the one shared instance; render calls
/// share no mutable state, so concurrent requests need no locking.
struct AppState {
    renderer: QrRenderer,
    default_pixel_size: u32,
}

/// Starts the web server serving the embedded form UI and the generation API.
pub async fn run_server(config: &AppConfig, renderer: QrRenderer) -> Result<()> {
    let app_state = Arc::new(AppState {
        renderer,
        default_pixel_size: config.renderer.pixel_size,
    });

    let app = Router::new()
        .route("/api/generate", post(api_generate))
        .route("/api/wifi", post(api_generate_wifi))
        .fallback(get(serve_static_asset))
        .with_state(app_state);

    tracing::info!("🌐 Web server listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

#[derive(Deserialize)]
struct GenerateRequest {
    text: String,
    size: Option<u32>,
}

#[derive(Deserialize)]
struct WifiGenerateRequest {
    ssid: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    security: SecurityMode,
    #[serde(default)]
    hidden: bool,
    size: Option<u32>,
}

/// Renders free text or a URL into a QR image.
async fn api_generate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateRequest>,
) -> Response {
    let text = payload.text.trim();
    if text.is_empty() {
        return validation_error("text must not be empty");
    }
    let size = match requested_size(payload.size, state.default_pixel_size) {
        Ok(size) => size,
        Err(response) => return response,
    };

    tracing::debug!(len = text.len(), "handling /api/generate");
    render_response(&state, RenderRequest::new(text, size)).await
}

/// Renders Wi-Fi credentials into a QR image.
///
/// The encoder itself is total; the non-empty-SSID precondition is enforced
/// here, before any credentials are encoded or any provider is contacted.
async fn api_generate_wifi(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WifiGenerateRequest>,
) -> Response {
    let ssid = payload.ssid.trim();
    if ssid.is_empty() {
        return validation_error("ssid must not be empty");
    }
    let size = match requested_size(payload.size, state.default_pixel_size) {
        Ok(size) => size,
        Err(response) => return response,
    };

    let credentials = WifiCredentials {
        ssid: ssid.to_string(),
        password: payload.password,
        security: payload.security,
        hidden: payload.hidden,
    };
    tracing::debug!(ssid = %credentials.ssid, "handling /api/wifi");

    render_response(&state, RenderRequest::new(credentials.encode(), size)).await
}

/// Resolves the optional client-supplied size against the configured default.
fn requested_size(size: Option<u32>, default: u32) -> std::result::Result<u32, Response> {
    match size {
        None => Ok(default),
        Some(s) if (MIN_PIXEL_SIZE..=MAX_PIXEL_SIZE).contains(&s) => Ok(s),
        Some(s) => {
            tracing::debug!(size = s, "rejecting out-of-range pixel size");
            Err(validation_error("size must be between 16 and 2048 pixels"))
        }
    }
}

fn validation_error(message: &str) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// Runs one render and translates the outcome for the browser.
///
/// Pixels become a downloadable PNG. A degraded success becomes a JSON body
/// carrying the provider URL; there is nothing to export in that case, so the
/// client is told to save the image manually.
async fn render_response(state: &AppState, request: RenderRequest) -> Response {
    match state.renderer.render(&request).await {
        Ok(RenderResult::Pixels(pixels)) => match encode_png(&pixels) {
            Ok(png) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "image/png")
                .header(
                    header::CONTENT_DISPOSITION,
                    "inline; filename=\"qr-code.png\"",
                )
                .body(Body::from(png))
                .unwrap_or_else(|_| {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response()
                }),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response(),
        },
        Ok(RenderResult::ImageReference(url)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "image_url": url,
                "note": "pixel data unavailable; save the image manually",
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("render failed: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn encode_png(pixels: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    pixels.write_to(&mut buf, image::ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Fallback handler serving the embedded UI.
///
/// Catches every GET not matched by an API route; the bare root maps to the
/// form page. The UI is a single embedded page, so lookup is a direct
/// `UiAsset` access with the MIME type guessed from the path.
async fn serve_static_asset(uri: Uri) -> impl IntoResponse {
    let mut path = uri.path().trim_start_matches('/');
    if path.is_empty() {
        path = "index.html";
    }

    match UiAsset::get(path) {
        Some(asset) => {
            let mime = mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime)
                .body(Body::from(asset.data))
                .unwrap_or_else(|_| {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response()
                })
        }
        None => {
            tracing::debug!("asset not found: {path}");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RendererConfig;
    use crate::fetchers::{MockFetcher, MockResponse, solid_raster};
    use crate::providers::Provider;

    fn state_with(fetcher: Arc<MockFetcher>) -> Arc<AppState> {
        let config = RendererConfig::default();
        Arc::new(AppState {
            renderer: QrRenderer::new(config.providers, fetcher, config.attempt_timeout),
            default_pixel_size: config.pixel_size,
        })
    }

    fn wifi_payload(ssid: &str) -> WifiGenerateRequest {
        WifiGenerateRequest {
            ssid: ssid.into(),
            password: "hunter2".into(),
            security: SecurityMode::Wpa,
            hidden: false,
            size: None,
        }
    }

    #[tokio::test]
    async fn empty_ssid_is_rejected_before_any_fetch() {
        let fetcher = Arc::new(MockFetcher::default());
        let state = state_with(fetcher.clone());

        let response = api_generate_wifi(State(state), Json(wifi_payload("   "))).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn out_of_range_size_is_rejected_before_any_fetch() {
        let fetcher = Arc::new(MockFetcher::default());
        let state = state_with(fetcher.clone());

        // u32::MAX would ask the resizer for a ~68 GB buffer.
        let payload = GenerateRequest {
            text: "x".into(),
            size: Some(u32::MAX),
        };
        let response = api_generate(State(state.clone()), Json(payload)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let payload = WifiGenerateRequest {
            size: Some(8),
            ..wifi_payload("home")
        };
        let response = api_generate_wifi(State(state), Json(payload)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn wifi_render_returns_png() {
        let fetcher = Arc::new(MockFetcher::with_script([MockResponse::raster(
            solid_raster(260, [0, 0, 0, 255]),
        )]));
        let state = state_with(fetcher);

        let response = api_generate_wifi(State(state), Json(wifi_payload("home"))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
    }

    #[tokio::test]
    async fn degraded_success_returns_image_url_json() {
        let fetcher = Arc::new(MockFetcher::with_script([MockResponse::opaque()]));
        let state = state_with(fetcher);

        let payload = GenerateRequest {
            text: "hello".into(),
            size: None,
        };
        let response = api_generate(State(state), Json(payload)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["image_url"],
            Provider::qr_server().build_url("hello", 260)
        );
        assert!(json["note"].as_str().unwrap().contains("manually"));
    }

    #[test]
    fn png_export_round_trips_dimensions() {
        let png = encode_png(&solid_raster(64, [255, 255, 255, 255])).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }
}
