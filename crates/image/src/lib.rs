//! Photo preparation for OpenMarket product uploads.
//!
//! This crate provides:
//! - Format detection from magic bytes
//! - Center square cropping
//! - Alpha flattening for JPEG output
//! - The size-budgeted upload preparer (crop, encode, resample until it fits)
//!
//! # Example
//!
//! ```
//! use image::{DynamicImage, RgbImage};
//! use openmarket_image::ImageUploadPreparer;
//!
//! let photo = DynamicImage::ImageRgb8(RgbImage::new(300, 200));
//! let prepared = ImageUploadPreparer::default().prepare(&photo).unwrap();
//!
//! assert_eq!(prepared.encoded.width(), prepared.encoded.height());
//! assert!(prepared.report.within_budget);
//! ```

#![warn(missing_docs)]

mod alpha;
mod budget;
mod config;
mod detect;
mod encode;
mod error;
mod prepare;
mod square;

pub use alpha::{flatten_alpha, has_alpha_channel};
pub use budget::{CompressionBudget, ScaleFactor, DEFAULT_BUDGET_BYTES};
pub use config::{OverBudgetPolicy, PreparerConfig};
pub use detect::{detect_format, ImageFormat};
pub use encode::{EncodedImage, JpegUploadEncoder, UploadEncoder};
pub use error::{ImageError, Result};
pub use prepare::{
    Attempt, AttemptOutcome, Downsampler, ImageUploadPreparer, PreparationReport, PreparedImage,
    ThumbnailDownsampler,
};
pub use square::{center_square, square_crop, SquareRegion};
