//! Size-budgeted upload preparation.
//!
//! A picked photo is cropped to its centered square, encoded at a fixed
//! JPEG quality, and then resampled to `side * scale` (scale 1.0, 0.9, 0.8,
//! ...) until the encoding fits the budget. Only spatial resolution changes
//! between attempts; quality stays fixed.
//!
//! A failed resample or re-encode is a no-op for that attempt. The scale
//! still steps down, so the loop ends after at most ten attempts even if
//! every attempt fails.

use crate::budget::{CompressionBudget, ScaleFactor};
use crate::config::{OverBudgetPolicy, PreparerConfig};
use crate::detect::require_decodable;
use crate::encode::{EncodedImage, JpegUploadEncoder, UploadEncoder};
use crate::square::square_crop;
use crate::{ImageError, Result};
use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use std::borrow::Cow;
use std::io::Cursor;
use tracing::{debug, info, warn};

/// Resamples a square image to a smaller square.
pub trait Downsampler {
    /// Produce a `side` x `side` version of the square `img`.
    fn downsample(&self, img: &DynamicImage, side: u32) -> Result<DynamicImage>;
}

/// Resampling through [`DynamicImage::thumbnail`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThumbnailDownsampler;

impl Downsampler for ThumbnailDownsampler {
    fn downsample(&self, img: &DynamicImage, side: u32) -> Result<DynamicImage> {
        if side == 0 {
            return Err(ImageError::DownsampleError(
                "target side must be at least one pixel".into(),
            ));
        }
        Ok(img.thumbnail(side, side))
    }
}

/// What happened on one resample attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Resampled and re-encoded; the new encoding replaced the previous one
    Encoded {
        /// Encoded length in bytes
        len: usize,
    },
    /// Re-encoded, but no smaller than the current encoding, which was kept
    NotSmaller {
        /// Encoded length in bytes
        len: usize,
    },
    /// Resampling failed; the previous image was kept
    DownsampleFailed {
        /// Error text
        reason: String,
    },
    /// Resampled but the encoder failed; the previous image was kept
    EncodeFailed {
        /// Error text
        reason: String,
    },
}

/// One pass of the resample loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    /// Scale used for this attempt
    pub scale: f64,
    /// Side the working image was resampled to
    pub target_side: u32,
    /// Result
    pub outcome: AttemptOutcome,
}

/// Record of a single preparation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparationReport {
    /// Source width
    pub source_width: u32,
    /// Source height
    pub source_height: u32,
    /// Side of the centered square
    pub square_side: u32,
    /// Whether the source needed cropping
    pub cropped: bool,
    /// Length of the first encoding
    pub initial_len: usize,
    /// Resample attempts, in order
    pub attempts: Vec<Attempt>,
    /// Length of the returned encoding
    pub final_len: usize,
    /// Side of the returned encoding
    pub final_side: u32,
    /// Budget in force
    pub budget_bytes: usize,
    /// Whether the returned encoding fits the budget
    pub within_budget: bool,
}

impl PreparationReport {
    /// True if at least one resample attempt ran.
    pub fn resampled(&self) -> bool {
        !self.attempts.is_empty()
    }

    /// Attempts that failed to resample or encode.
    pub fn failed_attempts(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| {
                matches!(
                    a.outcome,
                    AttemptOutcome::DownsampleFailed { .. } | AttemptOutcome::EncodeFailed { .. }
                )
            })
            .count()
    }

    /// Fraction of the initial size saved.
    pub fn savings_ratio(&self) -> f64 {
        if self.initial_len == 0 {
            return 0.0;
        }
        1.0 - self.final_len as f64 / self.initial_len as f64
    }
}

/// A photo ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedImage {
    /// The encoded square photo
    pub encoded: EncodedImage,
    /// How it was produced
    pub report: PreparationReport,
}

impl PreparedImage {
    /// Drop the report and keep the encoding.
    pub fn into_encoded(self) -> EncodedImage {
        self.encoded
    }
}

/// Turns picked photos into square, size-bounded JPEG uploads.
///
/// Stateless across calls: each `prepare` starts from scale 1.0.
#[derive(Debug, Clone)]
pub struct ImageUploadPreparer<D = ThumbnailDownsampler, E = JpegUploadEncoder> {
    config: PreparerConfig,
    downsampler: D,
    encoder: E,
}

impl ImageUploadPreparer {
    /// Build a preparer from validated configuration.
    pub fn new(config: PreparerConfig) -> Result<Self> {
        config.validate()?;
        let encoder = JpegUploadEncoder::new(config.quality).with_background(config.background);
        Ok(Self {
            config,
            downsampler: ThumbnailDownsampler,
            encoder,
        })
    }
}

impl Default for ImageUploadPreparer {
    fn default() -> Self {
        let config = PreparerConfig::default();
        let encoder = JpegUploadEncoder::new(config.quality).with_background(config.background);
        Self {
            config,
            downsampler: ThumbnailDownsampler,
            encoder,
        }
    }
}

impl<D: Downsampler, E: UploadEncoder> ImageUploadPreparer<D, E> {
    /// Replace the resampler.
    pub fn with_downsampler<D2: Downsampler>(self, downsampler: D2) -> ImageUploadPreparer<D2, E> {
        ImageUploadPreparer {
            config: self.config,
            downsampler,
            encoder: self.encoder,
        }
    }

    /// Replace the encoder.
    pub fn with_encoder<E2: UploadEncoder>(self, encoder: E2) -> ImageUploadPreparer<D, E2> {
        ImageUploadPreparer {
            config: self.config,
            downsampler: self.downsampler,
            encoder,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &PreparerConfig {
        &self.config
    }

    /// Active budget.
    pub fn budget(&self) -> CompressionBudget {
        self.config.budget()
    }

    /// Crop, encode and resample `source` until it fits the budget.
    ///
    /// `source` is only read. Fails with [`ImageError::PreparationFailed`]
    /// when the first encoding cannot be produced, and with
    /// [`ImageError::BudgetNotAchieved`] only under [`OverBudgetPolicy::Reject`].
    pub fn prepare(&self, source: &DynamicImage) -> Result<PreparedImage> {
        let (source_width, source_height) = source.dimensions();
        if source_width == 0 || source_height == 0 {
            return Err(ImageError::PreparationFailed(format!(
                "source image is {}x{}",
                source_width, source_height
            )));
        }

        let mut working = square_crop(source);
        let square_side = working.width();
        let cropped = matches!(working, Cow::Owned(_));

        let mut encoded = self
            .encoder
            .encode(&working)
            .map_err(|e| ImageError::PreparationFailed(e.to_string()))?;
        let initial_len = encoded.len();

        let budget = self.budget();
        let mut scale = ScaleFactor::initial();
        let mut attempts = Vec::new();

        while !budget.fits(encoded.len()) && !scale.is_exhausted() {
            let target_side = scale.target_dimension(working.width());

            let outcome = match self.downsampler.downsample(&working, target_side) {
                Ok(resampled) => match self.encoder.encode(&resampled) {
                    Ok(next) => {
                        let len = next.len();
                        working = Cow::Owned(resampled);
                        if len <= encoded.len() {
                            encoded = next;
                            AttemptOutcome::Encoded { len }
                        } else {
                            AttemptOutcome::NotSmaller { len }
                        }
                    }
                    Err(e) => AttemptOutcome::EncodeFailed {
                        reason: e.to_string(),
                    },
                },
                Err(e) => AttemptOutcome::DownsampleFailed {
                    reason: e.to_string(),
                },
            };

            debug!(
                scale = scale.value(),
                target_side,
                current_len = encoded.len(),
                outcome = ?outcome,
                "Resample attempt"
            );

            attempts.push(Attempt {
                scale: scale.value(),
                target_side,
                outcome,
            });
            scale.decrement();
        }

        let within_budget = budget.fits(encoded.len());
        let report = PreparationReport {
            source_width,
            source_height,
            square_side,
            cropped,
            initial_len,
            attempts,
            final_len: encoded.len(),
            final_side: encoded.width(),
            budget_bytes: budget.bytes(),
            within_budget,
        };

        if !within_budget {
            match self.config.over_budget {
                OverBudgetPolicy::Reject => {
                    return Err(ImageError::BudgetNotAchieved {
                        len: encoded.len(),
                        budget: budget.bytes(),
                    });
                }
                OverBudgetPolicy::Accept => warn!(
                    len = encoded.len(),
                    budget = budget.bytes(),
                    failed_attempts = report.failed_attempts(),
                    "Scale schedule exhausted; returning best-effort encoding over budget"
                ),
            }
        }

        info!(
            source = %format!("{}x{}", source_width, source_height),
            side = report.final_side,
            initial_len,
            final_len = report.final_len,
            attempts = report.attempts.len(),
            "Prepared image for upload"
        );

        Ok(PreparedImage { encoded, report })
    }

    /// Sniff, bound-check, decode and [`prepare`](Self::prepare) an encoded photo.
    pub fn prepare_bytes(&self, data: &[u8]) -> Result<PreparedImage> {
        let img = self.decode(data)?;
        self.prepare(&img)
    }

    /// Sniff and decode an encoded photo, refusing sources above
    /// `max_source_pixels` before any pixel data is allocated.
    pub fn decode(&self, data: &[u8]) -> Result<DynamicImage> {
        let format = require_decodable(data)?;

        let (width, height) = image::io::Reader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ImageError::PreparationFailed(e.to_string()))?
            .into_dimensions()
            .map_err(|e| ImageError::PreparationFailed(e.to_string()))?;

        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.config.max_source_pixels {
            return Err(ImageError::SourceTooLarge {
                width,
                height,
                limit: self.config.max_source_pixels,
            });
        }

        debug!(format = format.name(), width, height, "Decoding picked photo");

        image::load_from_memory(data)
            .map_err(|e| ImageError::PreparationFailed(format!("decode failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageFormat;
    use image::{Rgb, RgbImage};
    use proptest::prelude::*;
    use std::cell::Cell;

    /// Deterministic high-entropy pattern that JPEG cannot compress well.
    fn noise(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let mut h = x.wrapping_mul(0x9E37_79B1) ^ y.wrapping_mul(0x85EB_CA77);
            h ^= h >> 15;
            h = h.wrapping_mul(0xC2B2_AE3D);
            h ^= h >> 13;
            Rgb([h as u8, (h >> 8) as u8, (h >> 16) as u8])
        }))
    }

    fn flat(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([180, 90, 40])))
    }

    fn preparer_with_budget(budget_bytes: usize) -> ImageUploadPreparer {
        ImageUploadPreparer::new(PreparerConfig {
            budget_bytes,
            ..Default::default()
        })
        .unwrap()
    }

    struct FailingDownsampler;

    impl Downsampler for FailingDownsampler {
        fn downsample(&self, _img: &DynamicImage, _side: u32) -> Result<DynamicImage> {
            Err(ImageError::DownsampleError("decoder unavailable".into()))
        }
    }

    struct FailingEncoder;

    impl UploadEncoder for FailingEncoder {
        fn encode(&self, _img: &DynamicImage) -> Result<EncodedImage> {
            Err(ImageError::InvalidData("corrupt raster".into()))
        }
    }

    /// Emits a fake JPEG that grows by 100 bytes on every call.
    struct GrowingEncoder {
        calls: Cell<usize>,
    }

    impl UploadEncoder for GrowingEncoder {
        fn encode(&self, img: &DynamicImage) -> Result<EncodedImage> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            let (width, height) = img.dimensions();
            let bytes = vec![0xFF; 2_000 + call * 100];
            Ok(EncodedImage::new(bytes, ImageFormat::Jpeg, width, height))
        }
    }

    /// Succeeds on the first call only.
    struct FirstCallEncoder {
        calls: Cell<usize>,
    }

    impl UploadEncoder for FirstCallEncoder {
        fn encode(&self, img: &DynamicImage) -> Result<EncodedImage> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if call == 0 {
                JpegUploadEncoder::default().encode(img)
            } else {
                Err(ImageError::InvalidData("encoder crashed".into()))
            }
        }
    }

    #[test]
    fn test_landscape_photo_fits_budget() {
        let source = noise(3000, 2000);
        let prepared = ImageUploadPreparer::default().prepare(&source).unwrap();
        let report = &prepared.report;

        assert_eq!(report.square_side, 2000);
        assert!(report.cropped);
        assert!(report.resampled());
        assert!(report.within_budget);
        assert!(prepared.encoded.len() <= 60_000);
        assert_eq!(prepared.encoded.width(), prepared.encoded.height());
        assert!(report.attempts.len() <= ScaleFactor::max_attempts());
    }

    #[test]
    fn test_encoded_sizes_never_increase() {
        let prepared = ImageUploadPreparer::default()
            .prepare(&noise(900, 900))
            .unwrap();
        let report = prepared.report;

        let mut current = report.initial_len;
        for attempt in &report.attempts {
            if let AttemptOutcome::Encoded { len } = attempt.outcome {
                assert!(len <= current);
                current = len;
            }
        }
        assert_eq!(current, report.final_len);
        assert!(report.within_budget);
    }

    #[test]
    fn test_scale_schedule_is_linear() {
        let prepared = preparer_with_budget(1).prepare(&noise(200, 200)).unwrap();
        let scales: Vec<f64> = prepared.report.attempts.iter().map(|a| a.scale).collect();

        assert_eq!(scales.len(), 10);
        for (i, scale) in scales.iter().enumerate() {
            assert!((scale - (1.0 - 0.1 * i as f64)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_small_image_is_not_resampled() {
        let source = flat(100, 100);
        let expected = JpegUploadEncoder::default().encode(&source).unwrap();
        let prepared = ImageUploadPreparer::default().prepare(&source).unwrap();

        assert!(!prepared.report.resampled());
        assert!(!prepared.report.cropped);
        assert_eq!(prepared.encoded, expected);
        assert_eq!(prepared.report.initial_len, prepared.report.final_len);
    }

    #[test]
    fn test_failed_downsamples_fall_back_to_previous_encoding() {
        let source = noise(500, 500);
        let expected = JpegUploadEncoder::default().encode(&source).unwrap();
        let prepared = preparer_with_budget(1_000)
            .with_downsampler(FailingDownsampler)
            .prepare(&source)
            .unwrap();

        assert_eq!(prepared.encoded, expected);
        assert_eq!(prepared.report.attempts.len(), 10);
        assert_eq!(prepared.report.failed_attempts(), 10);
        assert!(!prepared.report.within_budget);
    }

    #[test]
    fn test_failed_reencode_keeps_previous_encoding() {
        let source = noise(300, 300);
        let prepared = preparer_with_budget(1_000)
            .with_encoder(FirstCallEncoder { calls: Cell::new(0) })
            .prepare(&source)
            .unwrap();

        assert_eq!(prepared.encoded.width(), 300);
        assert!(prepared
            .report
            .attempts
            .iter()
            .all(|a| matches!(a.outcome, AttemptOutcome::EncodeFailed { .. })));
    }

    #[test]
    fn test_larger_reencode_keeps_previous_encoding() {
        let prepared = preparer_with_budget(1_000)
            .with_encoder(GrowingEncoder { calls: Cell::new(0) })
            .prepare(&flat(100, 100))
            .unwrap();

        let report = &prepared.report;
        assert_eq!(report.initial_len, 2_000);
        assert_eq!(report.final_len, report.initial_len);
        assert_eq!(prepared.encoded.len(), 2_000);
        assert!(!report.within_budget);
        assert_eq!(report.attempts.len(), ScaleFactor::max_attempts());
        for (i, attempt) in report.attempts.iter().enumerate() {
            assert_eq!(
                attempt.outcome,
                AttemptOutcome::NotSmaller {
                    len: 2_100 + i * 100
                }
            );
        }
    }

    #[test]
    fn test_reject_policy_reports_budget_not_achieved() {
        let preparer = ImageUploadPreparer::new(PreparerConfig {
            budget_bytes: 1_000,
            over_budget: OverBudgetPolicy::Reject,
            ..Default::default()
        })
        .unwrap()
        .with_downsampler(FailingDownsampler);

        let err = preparer.prepare(&noise(200, 200)).unwrap_err();
        assert!(matches!(err, ImageError::BudgetNotAchieved { budget: 1_000, .. }));
    }

    #[test]
    fn test_initial_encode_failure_is_fatal() {
        let err = ImageUploadPreparer::default()
            .with_encoder(FailingEncoder)
            .prepare(&flat(10, 10))
            .unwrap_err();
        assert!(matches!(err, ImageError::PreparationFailed(_)));
        assert!(err.is_fatal());

        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 4));
        assert!(matches!(
            ImageUploadPreparer::default().prepare(&empty),
            Err(ImageError::PreparationFailed(_))
        ));
    }

    #[test]
    fn test_source_is_not_mutated() {
        let source = noise(320, 240);
        let before = source.clone();
        ImageUploadPreparer::default().prepare(&source).unwrap();
        assert_eq!(source, before);
    }

    #[test]
    fn test_prepare_bytes_from_png() {
        let mut png = Vec::new();
        flat(120, 80)
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();

        let prepared = ImageUploadPreparer::default().prepare_bytes(&png).unwrap();
        assert_eq!(prepared.report.square_side, 80);
        assert_eq!(prepared.encoded.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_prepare_bytes_rejects_bad_input() {
        let preparer = ImageUploadPreparer::default();

        assert!(matches!(
            preparer.prepare_bytes(b"not an image at all"),
            Err(ImageError::UnknownFormat)
        ));
        assert!(matches!(
            preparer.prepare_bytes(b"\x00\x00\x00\x18ftypheic"),
            Err(ImageError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            preparer.prepare_bytes(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]),
            Err(ImageError::PreparationFailed(_))
        ));
    }

    #[test]
    fn test_prepare_bytes_enforces_pixel_limit() {
        let mut png = Vec::new();
        flat(50, 50)
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();

        let preparer = ImageUploadPreparer::new(PreparerConfig {
            max_source_pixels: 100,
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(
            preparer.prepare_bytes(&png),
            Err(ImageError::SourceTooLarge { width: 50, height: 50, limit: 100 })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_output_is_square(width in 1u32..96, height in 1u32..96) {
            let prepared = preparer_with_budget(600).prepare(&noise(width, height)).unwrap();
            prop_assert_eq!(prepared.report.square_side, width.min(height));
            prop_assert_eq!(prepared.encoded.width(), prepared.encoded.height());
            prop_assert!(prepared.report.attempts.len() <= ScaleFactor::max_attempts());
        }
    }
}
