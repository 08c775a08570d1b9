use serde::{Deserialize, Serialize};

/// Security mode of the target network, as announced in the payload.
/// Open networks are encoded with the literal `nopass` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SecurityMode {
    #[serde(rename = "nopass", alias = "open", alias = "OPEN")]
    Open,
    #[default]
    #[serde(rename = "WPA", alias = "wpa")]
    Wpa,
    #[serde(rename = "WEP", alias = "wep")]
    Wep,
}

impl SecurityMode {
    /// The literal token used in the `T:` field.
    pub fn token(&self) -> &'static str {
        match self {
            SecurityMode::Open => "nopass",
            SecurityMode::Wpa => "WPA",
            SecurityMode::Wep => "WEP",
        }
    }
}

/// Credentials for a single Wi-Fi network, as entered by the user.
///
/// The encoder does not validate these; in particular a non-empty SSID is the
/// caller's responsibility (the web layer rejects empty SSIDs before this
/// struct is ever built).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String, // may be empty (open networks)
    pub security: SecurityMode,
    pub hidden: bool,
}

impl WifiCredentials {
    /// Encodes the credentials into the `WIFI:T:...;S:...;P:...;H:...;;`
    /// configuration string consumed by QR readers.
    ///
    /// Deterministic and total: same input, byte-identical output, no failure
    /// mode.
    pub fn encode(&self) -> String {
        format!(
            "WIFI:T:{};S:{};P:{};H:{};;",
            self.security.token(),
            escape_field(&self.ssid),
            escape_field(&self.password),
            if self.hidden { "true" } else { "false" },
        )
    }
}

/// Escapes the delimiter set `\ " ; , :` with a preceding backslash.
///
/// Single pass over the original string, so an already-present backslash is
/// escaped exactly once and never re-escaped together with the character it
/// precedes.
fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        if matches!(c, '\\' | '"' | ';' | ',' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
