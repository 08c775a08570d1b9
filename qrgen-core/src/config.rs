use crate::Result;
use crate::providers::Provider;
use serde::Deserialize;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub renderer: RendererConfig,
}

/// Runtime configuration of the renderer: the fallback chain and its budgets.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub attempt_timeout: Duration,
    pub pixel_size: u32,
    pub providers: Vec<Provider>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(5),
            pixel_size: 260,
            providers: vec![Provider::qr_server(), Provider::google_charts()],
        }
    }
}

// Temporary structs mirroring the TOML layout.

#[derive(Deserialize)]
struct AppConfigFile {
    /// [server] table
    server: ServerToml,

    /// [renderer] table
    renderer: RendererToml,
}

#[derive(Deserialize)]
struct ServerToml {
    bind_addr: String,
}

#[derive(Deserialize)]
struct RendererToml {
    timeout_ms: u64,
    pixel_size: u32,

    /// [[renderer.providers]] entries, tried in file order.
    /// An empty list falls back to the built-in chain.
    #[serde(default)]
    providers: Vec<Provider>,
}

impl From<RendererToml> for RendererConfig {
    fn from(t: RendererToml) -> Self {
        let providers = if t.providers.is_empty() {
            RendererConfig::default().providers
        } else {
            t.providers
        };
        RendererConfig {
            attempt_timeout: Duration::from_millis(t.timeout_ms),
            pixel_size: t.pixel_size,
            providers,
        }
    }
}

/// Loads the application configuration from a TOML string.
pub fn load_config_from_toml_str(s: &str) -> Result<AppConfig> {
    let parsed: AppConfigFile = toml::from_str(s)?;
    let bind_addr = SocketAddr::from_str(&parsed.server.bind_addr)?;

    Ok(AppConfig {
        bind_addr,
        renderer: RendererConfig::from(parsed.renderer),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        bind_addr = "127.0.0.1:3000"

        [renderer]
        timeout_ms = 7500
        pixel_size = 320

        [[renderer.providers]]
        name = "quickchart"
        url_template = "https://quickchart.io/qr?size={size}&text={text}"
    "#;

    #[test]
    fn parses_full_config() {
        let config = load_config_from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.renderer.attempt_timeout, Duration::from_millis(7500));
        assert_eq!(config.renderer.pixel_size, 320);
        assert_eq!(config.renderer.providers.len(), 1);
        assert_eq!(config.renderer.providers[0].name, "quickchart");
    }

    #[test]
    fn missing_providers_fall_back_to_builtin_chain() {
        let config = load_config_from_toml_str(
            "[server]\nbind_addr = \"0.0.0.0:80\"\n[renderer]\ntimeout_ms = 5000\npixel_size = 260\n",
        )
        .unwrap();
        assert_eq!(config.renderer.providers.len(), 2);
        assert_eq!(config.renderer.providers[0].name, "qrserver");
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(load_config_from_toml_str("renderer = ").is_err());
    }
}
