//! Error types for the image crate.

use thiserror::Error;

/// Result type alias for image operations.
pub type Result<T> = std::result::Result<T, ImageError>;

/// Errors that can occur while preparing a photo for upload.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Unknown image format
    #[error("Unknown image format")]
    UnknownFormat,

    /// Recognised but not decodable by this build
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(&'static str),

    /// Invalid image data
    #[error("Invalid image data: {0}")]
    InvalidData(String),

    /// The source could not be decoded or given an initial encoding
    #[error("Image preparation failed: {0}")]
    PreparationFailed(String),

    /// Every resample attempt was used and the encoding still exceeds the budget
    #[error("Encoded image is {len} bytes, over the {budget} byte budget")]
    BudgetNotAchieved {
        /// Length of the smallest encoding reached
        len: usize,
        /// Configured budget
        budget: usize,
    },

    /// Source dimensions above the configured pixel limit
    #[error("{width}x{height} photo exceeds the {limit} pixel limit")]
    SourceTooLarge {
        /// Source width
        width: u32,
        /// Source height
        height: u32,
        /// Configured limit
        limit: u64,
    },

    /// A single resample step failed
    #[error("Downsample error: {0}")]
    DownsampleError(String),

    /// Invalid preparer configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Image processing error
    #[error("Image processing error: {0}")]
    ProcessingError(#[from] image::ImageError),
}

impl ImageError {
    /// Whether the caller should abort the upload flow for this image slot.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ImageError::DownsampleError(_))
    }
}
