//! Error types for the register crate.

use crate::request::UploadError;
use crate::slots::SlotError;
use crate::validation::ValidationError;
use openmarket_image::ImageError;
use thiserror::Error;

/// Result type alias for registration operations.
pub type Result<T> = std::result::Result<T, RegisterError>;

/// Errors surfaced by the registration controller.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// The draft did not pass validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A picked photo could not be prepared
    #[error("Photo could not be prepared: {0}")]
    Image(#[from] ImageError),

    /// The uploader failed
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    /// Slot index out of range
    #[error(transparent)]
    Slot(#[from] SlotError),

    /// A photo arrived without a preceding gallery selection
    #[error("No photo slot is waiting for a pick")]
    NoPendingPick,

    /// Photos cannot change while editing an existing product
    #[error("Photos are read-only while editing")]
    ReadOnly,
}
