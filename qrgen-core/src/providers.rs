use serde::{Deserialize, Serialize};

/// A remote QR rendering service, configured as a URL template.
///
/// The template carries two placeholders: `{size}` (edge length in pixels)
/// and `{text}` (the payload, percent-encoded before substitution).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub url_template: String,
}

impl Provider {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
        }
    }

    /// goqr.me's hosted API.
    pub fn qr_server() -> Self {
        Self::new(
            "qrserver",
            "https://api.qrserver.com/v1/create-qr-code/?size={size}x{size}&data={text}",
        )
    }

    /// The Google Charts QR endpoint.
    pub fn google_charts() -> Self {
        Self::new(
            "google-charts",
            "https://chart.googleapis.com/chart?chs={size}x{size}&cht=qr&chl={text}",
        )
    }

    pub fn quickchart() -> Self {
        Self::new("quickchart", "https://quickchart.io/qr?size={size}&text={text}")
    }

    /// Builds the request URL for a payload.
    ///
    /// `text` is percent-encoded per URL component rules, so the substituted
    /// value can never introduce reserved characters (or a stray `{size}`)
    /// into the final URL. Size is substituted first for the same reason.
    pub fn build_url(&self, text: &str, size_pixels: u32) -> String {
        self.url_template
            .replace("{size}", &size_pixels.to_string())
            .replace("{text}", &urlencoding::encode(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_size_everywhere() {
        let url = Provider::qr_server().build_url("hello", 260);
        assert_eq!(
            url,
            "https://api.qrserver.com/v1/create-qr-code/?size=260x260&data=hello"
        );
    }

    #[test]
    fn percent_encodes_payload_text() {
        let url = Provider::google_charts().build_url("WIFI:T:WPA;S:a b;;", 100);
        assert!(url.ends_with("chl=WIFI%3AT%3AWPA%3BS%3Aa%20b%3B%3B"));
        // No raw reserved characters from the payload survive.
        let query = url.split("chl=").nth(1).unwrap();
        assert!(!query.contains(':') && !query.contains(';') && !query.contains(' '));
    }

    #[test]
    fn payload_cannot_inject_placeholders() {
        let url = Provider::quickchart().build_url("{size}", 64);
        assert_eq!(url, "https://quickchart.io/qr?size=64&text=%7Bsize%7D");
    }
}
