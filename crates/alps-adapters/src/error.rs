//! Error types for backend construction

use thiserror::Error;

/// Result type alias for adapter construction
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors raised while building a backend
#[derive(Error, Debug)]
pub enum AdapterError {
    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL failed to parse
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
