//! Core library for the QR relay.
//! This crate defines the payload encoding (Wi-Fi configuration strings),
//! the provider URL templates, the `ImageFetcher` capability with its HTTP
//! and mock implementations, and the resilient renderer that races each
//! fetch against a timeout and falls back through the provider chain.

pub mod config;
pub mod fetchers;
pub mod providers;
pub mod renderer;
pub mod traits;
pub mod web_server;
pub mod wifi;

// Define a shared Error and Result type for the entire crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A provider attempt (or a single-provider chain) exceeded the budget.
    #[error("provider timed out")]
    Timeout,

    /// A provider explicitly reported failure (transport or HTTP status).
    #[error("provider fetch failed: {0}")]
    Fetch(String),

    /// The fallback chain ran out of providers without a success.
    #[error("all providers exhausted: {0}")]
    ProvidersExhausted(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid bind address: {0}")]
    BindAddr(#[from] std::net::AddrParseError),

    #[error("image encode error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;
