//! Error types for CineMind.

use thiserror::Error;

/// Library-level error type for CineMind operations.
#[derive(Error, Debug)]
pub enum CineMindError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding provider unavailable: {0}")]
    Embedding(String),

    #[error("Vector index is empty: build the index before querying")]
    IndexEmpty,

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Corpus artifact error: {0}")]
    Corpus(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Profiling failed: {0}")]
    Profile(String),

    #[error("Metadata lookup failed: {0}")]
    Metadata(String),

    #[error("Session error: {0}")]
    Session(String),

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

/// Result type alias for CineMind operations.
pub type Result<T> = std::result::Result<T, CineMindError>;
