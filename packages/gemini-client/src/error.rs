//! Error types for the Gemini client.

use thiserror::Error;

/// Result type for Gemini client operations.
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Gemini client errors.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// Configuration error (missing API key, missing project)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, stream interrupted)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, blocked prompt, error payload mid-stream)
    #[error("API error: {0}")]
    Api(String),

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}
