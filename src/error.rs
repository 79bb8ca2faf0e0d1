//! Error types for Tubechat.

use thiserror::Error;

/// Library-level error type for Tubechat operations.
#[derive(Error, Debug)]
pub enum TubechatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No usable captions for video {0}")]
    TranscriptUnavailable(String),

    #[error("Transcript fetch failed: {0}")]
    Fetch(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorStore(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl TubechatError {
    /// Whether the failure happened while talking to the transcript source.
    ///
    /// A missing `yt-dlp` binary counts, since no transcript can be fetched without it.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, TubechatError::Fetch(_) | TubechatError::ToolNotFound(_))
    }
}

/// Result type alias for Tubechat operations.
pub type Result<T> = std::result::Result<T, TubechatError>;
