//! Error types for geoquery

use std::time::Duration;
use thiserror::Error;

/// Main error type for geoquery operations
#[derive(Error, Debug)]
pub enum Error {
    /// A configured lookup name has no adapter behind it
    #[error(
        "Configuration error: cannot instantiate {name:?} lookup. \
         Make sure the lookup is set to a valid geocoder, e.g. one of: {valid}"
    )]
    UnknownLookup { name: String, valid: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Lookup error ({provider}): {message}")]
    Lookup { provider: String, message: String },

    #[error("No response translator is bundled for the {0} lookup; register an adapter for it")]
    UnsupportedLookup(String),

    #[error("Lookup {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a provider-scoped lookup error
    pub fn lookup(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lookup {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for geoquery operations
pub type Result<T> = std::result::Result<T, Error>;
