//! Alpha flattening. JPEG has no alpha channel, so transparent product
//! photos (screenshots, PNG cut-outs) are composited over a solid background
//! before encoding.

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb, RgbImage};

/// Composite `img` over `background` and return an opaque RGB raster.
pub fn flatten_alpha(img: &DynamicImage, background: [u8; 3]) -> RgbImage {
    if !has_alpha_channel(img) {
        return img.to_rgb8();
    }

    let (width, height) = img.dimensions();
    let rgba = img.to_rgba8();
    let mut output = ImageBuffer::new(width, height);

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = f32::from(a) / 255.0;
        let blend = |channel: u8, bg: u8| {
            (f32::from(channel) * alpha + f32::from(bg) * (1.0 - alpha)).round() as u8
        };

        output.put_pixel(
            x,
            y,
            Rgb([
                blend(r, background[0]),
                blend(g, background[1]),
                blend(b, background[2]),
            ]),
        );
    }

    output
}

/// Check if an image has an alpha channel.
pub fn has_alpha_channel(img: &DynamicImage) -> bool {
    img.color().has_alpha()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_flatten_over_white() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, Rgba([0, 255, 0, 128]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 0]));
        img.put_pixel(1, 1, Rgba([255, 255, 0, 255]));

        let result = flatten_alpha(&DynamicImage::ImageRgba8(img), [255, 255, 255]);

        assert_eq!(result.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(result.get_pixel(1, 0), &Rgb([255, 255, 255]));
        assert_eq!(result.get_pixel(1, 1), &Rgb([255, 255, 0]));

        let half = result.get_pixel(0, 1);
        assert_eq!(half[1], 255);
        assert!(half[0] > 120 && half[0] < 135);
    }

    #[test]
    fn test_opaque_image_passes_through() {
        let mut img = image::RgbImage::new(1, 1);
        img.put_pixel(0, 0, Rgb([10, 20, 30]));

        let result = flatten_alpha(&DynamicImage::ImageRgb8(img), [0, 0, 0]);
        assert_eq!(result.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_has_alpha_channel() {
        let rgba_img = DynamicImage::ImageRgba8(RgbaImage::new(1, 1));
        assert!(has_alpha_channel(&rgba_img));

        let rgb_img = DynamicImage::ImageRgb8(image::RgbImage::new(1, 1));
        assert!(!has_alpha_channel(&rgb_img));
    }
}
