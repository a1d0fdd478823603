//! Error types for the instrument directory

use thiserror::Error;

/// Directory error types
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Lookup called with a blank exchange or symbol
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Catalog download failed (status, empty body, transport, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Catalog payload is not a valid gzip/UTF-8 stream
    #[error("Decode error: {0}")]
    Decode(String),

    /// Catalog text is not an array of instrument objects
    #[error("Format error: {0}")]
    Format(String),

    /// No exact or variant match for the symbol
    #[error("Instrument key not found for symbol {symbol} on exchange {exchange}")]
    NotFound {
        /// Exchange the lookup ran against
        exchange: String,
        /// Symbol as supplied by the caller
        symbol: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DirectoryError {
    /// True for failures that abort a refresh (fetch, decode, parse)
    #[must_use]
    pub const fn is_refresh_failure(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Decode(_) | Self::Format(_))
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<config::ConfigError> for DirectoryError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, DirectoryError>;
