use thiserror::Error;

/// Top-level error type for Warden.
#[derive(Debug, Error)]
pub enum WardenError {
    /// Prompt is empty, whitespace-only, or exceeds the accepted length.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An individual risk extractor failed. Isolated by the analyzer —
    /// never fatal to a whole analysis call.
    #[error("extractor '{name}' failed: {reason}")]
    Extractor { name: String, reason: String },

    /// The sanitizer could not produce a safe rewrite.
    #[error("sanitization failed: {0}")]
    Sanitize(String),

    /// Flagged-prompt store error.
    #[error("store error: {0}")]
    Store(String),

    /// External scorer error or timeout.
    #[error("scorer error: {0}")]
    Scorer(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
