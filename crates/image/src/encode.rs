//! Upload encoding.

use crate::alpha::flatten_alpha;
use crate::{ImageError, ImageFormat, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView};

/// An encoded photo ready to attach to an upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl EncodedImage {
    /// Wrap already-encoded bytes.
    pub fn new(bytes: Vec<u8>, format: ImageFormat, width: u32, height: u32) -> Self {
        Self {
            bytes,
            format,
            width,
            height,
        }
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if there are no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Encoding format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// MIME type for the upload part.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Width of the encoded raster.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the encoded raster.
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Encodes a raster for upload.
pub trait UploadEncoder {
    /// Encode `img`. Called once for the initial encoding and once per resample.
    fn encode(&self, img: &DynamicImage) -> Result<EncodedImage>;
}

/// Fixed-quality baseline JPEG encoder.
#[derive(Debug, Clone, Copy)]
pub struct JpegUploadEncoder {
    quality: u8,
    background: [u8; 3],
}

impl JpegUploadEncoder {
    /// Encoder at `quality` (clamped to 1-100) flattening alpha onto white.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
            background: [255, 255, 255],
        }
    }

    /// Flatten transparency onto `background` instead of white.
    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    /// Configured quality.
    pub fn quality(&self) -> u8 {
        self.quality
    }
}

impl Default for JpegUploadEncoder {
    fn default() -> Self {
        Self::new(50)
    }
}

impl UploadEncoder for JpegUploadEncoder {
    fn encode(&self, img: &DynamicImage) -> Result<EncodedImage> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidData(format!(
                "cannot encode a {}x{} image",
                width, height
            )));
        }

        let rgb = flatten_alpha(img, self.background);
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.quality).encode_image(&rgb)?;

        Ok(EncodedImage::new(bytes, ImageFormat::Jpeg, width, height))
    }
}
