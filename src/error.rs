//! Error types for image loading and viewer configuration.

use thiserror::Error;

/// Errors surfaced through the `on_load_error` callback.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read image '{url}': {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image '{url}': {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported image URL '{0}'")]
    UnsupportedUrl(String),

    #[error("No image registered for '{0}'")]
    NotFound(String),

    #[error("Loader stopped before '{0}' finished")]
    Disconnected(String),
}

impl LoadError {
    /// The URL the failed load was started for.
    pub fn url(&self) -> &str {
        match self {
            LoadError::Io { url, .. } | LoadError::Decode { url, .. } => url,
            LoadError::UnsupportedUrl(url)
            | LoadError::NotFound(url)
            | LoadError::Disconnected(url) => url,
        }
    }
}

/// Errors raised while reading, validating or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported config version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Invalid {name} range: min {min} is greater than max {max}")]
    InvertedRange { name: &'static str, min: f64, max: f64 },

    #[error("Invalid {name}: {value} must be a finite positive number")]
    InvalidStep { name: &'static str, value: f64 },

    #[error("Default {name} {value} lies outside [{min}, {max}]")]
    DefaultOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Unknown gesture trigger '{0}'")]
    UnknownTrigger(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
