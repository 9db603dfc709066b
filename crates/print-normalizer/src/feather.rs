//! Edge feathering: a smooth alpha falloff towards every image edge.
//!
//! Alpha is scaled by `curve(d / radius)` where `d` is the pixel distance
//! to the nearest edge. Pixels on the edge become fully transparent and
//! pixels `radius` or more away keep their alpha.

use image::RgbaImage;
use tracing::debug;

use crate::spec::FeatherCurve;

/// Alpha multiplier for a pixel `distance` pixels away from the nearest edge.
pub fn feather_factor(distance: u32, radius: u32, curve: FeatherCurve) -> f32 {
    if radius == 0 || distance >= radius {
        return 1.0;
    }
    let t = distance as f32 / radius as f32;
    match curve {
        FeatherCurve::Linear => t,
        FeatherCurve::Smoothstep => t * t * (3.0 - 2.0 * t),
    }
}

/// Apply the feather ramp in place. A radius of zero is a no-op.
pub fn feather_edges(img: &mut RgbaImage, radius: u32, curve: FeatherCurve) {
    let (width, height) = img.dimensions();
    if radius == 0 {
        debug!(width, height, "Feather radius is zero, skipping feathering");
        return;
    }

    debug!(width, height, radius, ?curve, "Feathering edges");

    // No pixel is farther than half the shorter side from an edge, so the
    // table never needs more entries than that, whatever the radius.
    let len = radius.min(width.min(height).div_ceil(2));
    let ramp: Vec<f32> = (0..len)
        .map(|d| feather_factor(d, radius, curve))
        .collect();

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let distance = x.min(y).min(width - 1 - x).min(height - 1 - y);
        if distance >= radius {
            continue;
        }
        let scaled = f32::from(pixel[3]) * ramp[distance as usize];
        pixel[3] = scaled.round().clamp(0.0, 255.0) as u8;
    }
}
