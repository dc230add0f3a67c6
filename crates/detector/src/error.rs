//! Detection pipeline errors

use correspondence_common::GeometryError;
use thiserror::Error;

/// Errors that can occur during correspondence detection
#[derive(Debug, Error)]
pub enum DetectError {
    /// A single OCR block has invalid or degenerate geometry. Recovered
    /// locally by dropping the block; never aborts the image.
    #[error("Malformed OCR block: {0}")]
    MalformedBlock(String),

    /// The OCR backend reported an error payload, produced an unusable
    /// payload, or could not be invoked. Fatal for the image.
    #[error("OCR backend error: {0}")]
    Backend(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<GeometryError> for DetectError {
    fn from(err: GeometryError) -> Self {
        DetectError::MalformedBlock(err.to_string())
    }
}

/// Result type for detection operations
pub type Result<T> = std::result::Result<T, DetectError>;
