//! Error types for the Carte gateway

use thiserror::Error;

/// Result type alias for Carte operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Carte gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Catalog loading error (startup-level, never per-turn)
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Language-model call error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Unknown or expired session
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
