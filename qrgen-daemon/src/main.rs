use anyhow::{Context, Result};
use qrgen_core::config::{AppConfig, load_config_from_toml_str};
use qrgen_core::fetchers::HttpFetcher;
use qrgen_core::renderer::QrRenderer;
use qrgen_core::web_server;
use std::sync::Arc;

/// Built-in configuration, used unless QRGEN_CONFIG points at a file.
const DEFAULT_CONFIG: &str = include_str!("../config.toml");

fn load_config() -> Result<AppConfig> {
    let raw = match std::env::var("QRGEN_CONFIG") {
        Ok(path) => {
            tracing::info!("📄 Loading config from {path}");
            std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?
        }
        Err(_) => DEFAULT_CONFIG.to_string(),
    };
    load_config_from_toml_str(&raw).context("parsing config TOML")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = load_config()?;
    tracing::info!(
        "🚀 Starting QR relay with {} provider(s), {}ms attempt budget",
        config.renderer.providers.len(),
        config.renderer.attempt_timeout.as_millis()
    );

    let renderer = QrRenderer::new(
        config.renderer.providers.clone(),
        Arc::new(HttpFetcher::new()),
        config.renderer.attempt_timeout,
    );

    if let Err(e) = web_server::run_server(&config, renderer).await {
        tracing::error!("❌ Web server failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
