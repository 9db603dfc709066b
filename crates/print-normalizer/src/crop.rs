//! Crop rectangle validation and slicing.

use image::RgbaImage;
use image::imageops;
use tracing::debug;

use crate::spec::CropArea;
use crate::{NormalizeError, Result};

/// Check that `area` has positive size and lies inside a `width`x`height` canvas.
pub fn validate_crop(area: &CropArea, width: u32, height: u32) -> Result<()> {
    let fits = area.x >= 0
        && area.y >= 0
        && area.width > 0
        && area.height > 0
        && area
            .x
            .checked_add(area.width)
            .is_some_and(|right| right <= i64::from(width))
        && area
            .y
            .checked_add(area.height)
            .is_some_and(|bottom| bottom <= i64::from(height));

    if fits {
        Ok(())
    } else {
        Err(NormalizeError::InvalidCropArea {
            x: area.x,
            y: area.y,
            width: area.width,
            height: area.height,
            source_width: width,
            source_height: height,
        })
    }
}

/// Slice `img` to `area`, returning a new buffer.
pub fn crop(img: &RgbaImage, area: &CropArea) -> Result<RgbaImage> {
    let (width, height) = img.dimensions();
    validate_crop(area, width, height)?;

    // Bounds were checked above, so every value fits in u32.
    let (x, y) = (area.x as u32, area.y as u32);
    let (w, h) = (area.width as u32, area.height as u32);
    debug!(x, y, w, h, width, height, "Cropping image");

    Ok(imageops::crop_imm(img, x, y, w, h).to_image())
}
