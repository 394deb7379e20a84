//! Error types for podcast generation

use thiserror::Error;

/// Result type alias for podcast operations
pub type Result<T> = std::result::Result<T, PodcastError>;

/// Errors that can occur while turning a script into audio
#[derive(Error, Debug)]
pub enum PodcastError {
    /// Engine construction failed for a language code
    #[error("Failed to initialize engine for language '{language_code}': {message}")]
    EngineInit {
        language_code: String,
        message: String,
    },

    /// The speech engine failed on a piece of text
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Audio processing error
    #[error("Audio processing error: {0}")]
    AudioProcessing(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Speaker is not present in the registry
    #[error("Unknown speaker: {0}")]
    UnknownSpeaker(String),

    /// Python interop error
    #[error("Python error: {0}")]
    Python(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<pyo3::PyErr> for PodcastError {
    fn from(err: pyo3::PyErr) -> Self {
        PodcastError::Python(err.to_string())
    }
}
