//! Error types for Memgate

use thiserror::Error;

/// Top-level error type
#[derive(Error, Debug)]
pub enum MemgateError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Remote API error (non-success status or malformed payload)
    #[error("Mem0 API error: {0}")]
    Api(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Memgate operations
pub type Result<T> = std::result::Result<T, MemgateError>;
