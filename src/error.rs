//! Error types for the scanning core

use thiserror::Error;

/// Errors surfaced by the scanning subsystem
#[derive(Debug, Error)]
pub enum ScanError {
    /// The picked file is not an image
    #[error("{name} is not an image (mime type {mime})")]
    InvalidFile {
        /// File name as reported by the picker
        name: String,
        /// MIME type reported by the picker
        mime: String,
    },

    /// Image bytes could not be decoded or encoded
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem error while loading a file
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Rectangle could not be parsed or is out of range
    #[error("invalid rectangle: {0}")]
    InvalidRect(String),

    /// An operation needed a selected image and there is none
    #[error("no image selected")]
    NoImage,

    /// An operation needed a finalized selection and there is none
    #[error("no selection drawn")]
    NoSelection,
}

/// Result type for scanning operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Failure reported by a decode engine while starting a live stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    /// Raw message as reported by the engine or the platform
    pub message: String,
}

impl EngineError {
    /// Create an engine error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
