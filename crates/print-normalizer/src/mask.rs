//! Alpha masks: rounded corners and colour-key background removal.

use image::RgbaImage;
use tracing::debug;

use crate::spec::BackgroundKey;

/// Corner radius in pixels for a `width`x`height` canvas.
pub fn corner_radius_px(percent: f32, width: u32, height: u32) -> f32 {
    percent * width.min(height) as f32 / 100.0
}

/// Zero the alpha of every pixel outside the rounded-rectangle mask.
///
/// A pixel is cut when its centre lies inside one of the four `r`x`r`
/// corner boxes and farther than `r` from that corner's arc centre.
/// A radius of zero leaves the image untouched.
pub fn round_corners(img: &mut RgbaImage, radius: f32) {
    let (width, height) = img.dimensions();
    if radius <= 0.0 {
        debug!(width, height, "Corner radius is zero, skipping rounding");
        return;
    }

    let (w, h) = (width as f32, height as f32);
    let mut cleared = 0u64;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let px = x as f32 + 0.5;
        let py = y as f32 + 0.5;

        let cx = if px < radius {
            radius
        } else if px > w - radius {
            w - radius
        } else {
            continue;
        };
        let cy = if py < radius {
            radius
        } else if py > h - radius {
            h - radius
        } else {
            continue;
        };

        let (dx, dy) = (px - cx, py - cy);
        if dx * dx + dy * dy > radius * radius {
            pixel[3] = 0;
            cleared += 1;
        }
    }

    debug!(width, height, radius, cleared, "Rounded corners");
}

/// Make every pixel matching `key` fully transparent.
pub fn apply_background_key(img: &mut RgbaImage, key: &BackgroundKey) {
    let tolerance = i16::from(key.tolerance);
    let mut cleared = 0u64;

    for pixel in img.pixels_mut() {
        let matches = (0..3)
            .all(|c| (i16::from(pixel[c]) - i16::from(key.color[c])).abs() <= tolerance);
        if matches && pixel[3] != 0 {
            pixel[3] = 0;
            cleared += 1;
        }
    }

    debug!(
        color = ?key.color,
        tolerance = key.tolerance,
        cleared,
        "Applied background key"
    );
}
