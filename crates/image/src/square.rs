//! Center square cropping.

use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use std::borrow::Cow;

/// The square window taken from the middle of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SquareRegion {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Side length (the shorter side of the source)
    pub side: u32,
}

/// Compute the centered square of a `width` x `height` rectangle.
///
/// # Example
/// ```
/// use openmarket_image::center_square;
///
/// let region = center_square(3000, 2000);
/// assert_eq!((region.x, region.y, region.side), (500, 0, 2000));
/// ```
pub fn center_square(width: u32, height: u32) -> SquareRegion {
    let side = width.min(height);
    SquareRegion {
        x: (width - side) / 2,
        y: (height - side) / 2,
        side,
    }
}

/// Crop `img` to its centered square. Already-square images are borrowed, not copied.
pub fn square_crop(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    let (width, height) = img.dimensions();
    if width == height {
        return Cow::Borrowed(img);
    }

    let region = center_square(width, height);
    Cow::Owned(img.crop_imm(region.x, region.y, region.side, region.side))
}
