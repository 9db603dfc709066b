//! Print-size resampling.
//!
//! Scales the canvas to the pixel width a physical print needs at the
//! target DPI, preserving aspect ratio with Lanczos3 filtering.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

/// Resize an RGBA image to a target width while maintaining aspect ratio.
///
/// Returns the input unchanged if it already matches the target width.
/// Height is never rounded down to zero.
pub fn resize_to_width(img: RgbaImage, width: u32) -> RgbaImage {
    let (orig_w, orig_h) = img.dimensions();

    if orig_w == width {
        debug!(width, "Image already at print width, skipping resample");
        return img;
    }

    let ratio = f64::from(width) / f64::from(orig_w);
    let new_height = (f64::from(orig_h) * ratio).round() as u32;
    let new_height = new_height.max(1);

    debug!(
        orig_w,
        orig_h,
        new_width = width,
        new_height,
        upscale = width > orig_w,
        "Resampling image to print width"
    );

    imageops::resize(&img, width, new_height, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn create_test_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([128, 64, 32, 255]))
    }

    #[test]
    fn test_upscale_to_print_width() {
        let result = resize_to_width(create_test_image(200, 100), 600);
        assert_eq!(result.dimensions(), (600, 300));
    }

    #[test]
    fn test_downscale_to_print_width() {
        // 1080 * (300/1920) = 168.75
        let result = resize_to_width(create_test_image(1920, 1080), 300);
        assert_eq!(result.dimensions(), (300, 169));
    }

    #[test]
    fn test_same_width_returns_input() {
        let img = create_test_image(300, 500);
        let result = resize_to_width(img.clone(), 300);
        assert_eq!(result, img);
    }

    #[test]
    fn test_height_never_zero() {
        let result = resize_to_width(create_test_image(1000, 1), 10);
        assert_eq!(result.width(), 10);
        assert!(result.height() >= 1, "Height should be at least 1");
    }

    #[test]
    fn test_uniform_colour_survives_resample() {
        let result = resize_to_width(create_test_image(10, 10), 30);
        let p = result.get_pixel(15, 15);
        assert_eq!(p[3], 255);
        assert!((i16::from(p[0]) - 128).abs() <= 1);
    }
}
