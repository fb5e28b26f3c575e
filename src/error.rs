//! Error types for Gjest.

use thiserror::Error;

/// Library-level error type for Gjest operations.
#[derive(Error, Debug)]
pub enum GjestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Caption parse error: {0}")]
    CaptionParse(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Gjest operations.
pub type Result<T> = std::result::Result<T, GjestError>;
