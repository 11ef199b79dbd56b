//! Error types for Ganj.

use thiserror::Error;

/// Library-level error type for Ganj operations.
#[derive(Error, Debug)]
pub enum GanjError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingestion failed: {0}")]
    Ingest(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("RAG error: {0}")]
    Rag(String),

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

    /// Rejected user input. The message is meant to be shown to the end user as-is.
    #[error("{0}")]
    InvalidInput(String),
}

impl GanjError {
    /// Whether this error was caused by caller input rather than by the system.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, GanjError::InvalidInput(_))
    }
}

/// Result type alias for Ganj operations.
pub type Result<T> = std::result::Result<T, GanjError>;
