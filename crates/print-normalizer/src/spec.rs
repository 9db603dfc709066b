//! Print spec: the configuration bundle governing one normalization call.
//!
//! Values are validated, never clamped. A spec that would produce a
//! degraded print is rejected with [`NormalizeError::InvalidSpec`].

use serde::{Deserialize, Serialize};

use crate::{MAX_DPI, MAX_OUTPUT_DIMENSION, NormalizeError, Result};

/// Default print resolution.
pub const DEFAULT_DPI: i32 = 300;

/// Rectangle sliced out of the source before any other step.
///
/// Fields are signed so that negative values coming from a request body
/// can be reported as an invalid crop instead of failing to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropArea {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl CropArea {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Alpha falloff shape used for edge feathering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatherCurve {
    #[default]
    Linear,
    Smoothstep,
}

/// Colour-key background removal.
///
/// Pixels whose RGB channels are all within `tolerance` of `color` become
/// fully transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundKey {
    pub color: [u8; 3],
    pub tolerance: u8,
}

impl BackgroundKey {
    /// Key out near-white backgrounds.
    pub fn white(tolerance: u8) -> Self {
        Self {
            color: [255, 255, 255],
            tolerance,
        }
    }
}

/// Configuration for a single normalization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintSpec {
    /// Print resolution written to the PNG `pHYs` chunk.
    pub dpi: i32,

    /// Zero alpha outside a rounded-rectangle mask.
    pub round_corners: bool,

    /// Corner radius as a percentage of the shorter side (0..=50).
    pub corner_radius_percent: f32,

    /// Ramp alpha down to zero towards every edge.
    pub feather_edges: bool,

    /// Width of the feather band in pixels. 0 disables feathering.
    pub feather_radius_px: i32,

    pub feather_curve: FeatherCurve,

    /// Applied before every other step.
    pub crop_area: Option<CropArea>,

    pub background_key: Option<BackgroundKey>,

    /// Physical print width in inches. When set, the canvas is resampled
    /// to `print_width_in * dpi` pixels wide.
    pub print_width_in: Option<f32>,
}

impl Default for PrintSpec {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            round_corners: false,
            corner_radius_percent: 0.0,
            feather_edges: false,
            feather_radius_px: 0,
            feather_curve: FeatherCurve::Linear,
            crop_area: None,
            background_key: None,
            print_width_in: None,
        }
    }
}

impl PrintSpec {
    /// Create a spec with default settings (300 dpi, no effects).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set print resolution.
    pub fn with_dpi(mut self, dpi: i32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Builder: enable corner rounding with the given radius percentage.
    pub fn with_corner_radius(mut self, percent: f32) -> Self {
        self.round_corners = true;
        self.corner_radius_percent = percent;
        self
    }

    /// Builder: enable edge feathering with the given band width.
    pub fn with_feather(mut self, radius_px: i32) -> Self {
        self.feather_edges = true;
        self.feather_radius_px = radius_px;
        self
    }

    /// Builder: set feather curve.
    pub fn with_feather_curve(mut self, curve: FeatherCurve) -> Self {
        self.feather_curve = curve;
        self
    }

    /// Builder: set crop rectangle.
    pub fn with_crop(mut self, crop: CropArea) -> Self {
        self.crop_area = Some(crop);
        self
    }

    /// Builder: set background key.
    pub fn with_background_key(mut self, key: BackgroundKey) -> Self {
        self.background_key = Some(key);
        self
    }

    /// Builder: set physical print width in inches.
    pub fn with_print_width(mut self, inches: f32) -> Self {
        self.print_width_in = Some(inches);
        self
    }

    /// Check every field that does not depend on the source image.
    ///
    /// Crop bounds are checked later, once the source size is known.
    pub fn validate(&self) -> Result<()> {
        if self.dpi <= 0 || self.dpi > MAX_DPI {
            return Err(NormalizeError::InvalidSpec(format!(
                "dpi must be between 1 and {MAX_DPI}, got {}",
                self.dpi
            )));
        }

        let percent = self.corner_radius_percent;
        if !percent.is_finite() || !(0.0..=50.0).contains(&percent) {
            return Err(NormalizeError::InvalidSpec(format!(
                "corner_radius_percent must be between 0 and 50, got {percent}"
            )));
        }

        if self.feather_radius_px < 0 {
            return Err(NormalizeError::InvalidSpec(format!(
                "feather_radius_px must not be negative, got {}",
                self.feather_radius_px
            )));
        }

        if let Some(inches) = self.print_width_in {
            if !inches.is_finite() || inches <= 0.0 {
                return Err(NormalizeError::InvalidSpec(format!(
                    "print_width_in must be a positive number, got {inches}"
                )));
            }
            let pixels = self.print_width_px().unwrap_or(0);
            if pixels == 0 || pixels > MAX_OUTPUT_DIMENSION {
                return Err(NormalizeError::InvalidSpec(format!(
                    "print width of {inches}in at {} dpi is {pixels}px, must be between 1 and {MAX_OUTPUT_DIMENSION}",
                    self.dpi
                )));
            }
        }

        Ok(())
    }

    /// Target pixel width implied by `print_width_in` and `dpi`.
    pub fn print_width_px(&self) -> Option<u32> {
        self.print_width_in.map(|inches| {
            let px = (f64::from(inches) * f64::from(self.dpi)).round();
            if px.is_finite() && px >= 0.0 {
                px.min(f64::from(u32::MAX)) as u32
            } else {
                0
            }
        })
    }

    /// Effective feather band, or `None` when feathering is a no-op.
    pub(crate) fn feather_band(&self) -> Option<u32> {
        (self.feather_edges && self.feather_radius_px > 0).then_some(self.feather_radius_px as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec() {
        let spec = PrintSpec::default();
        assert_eq!(spec.dpi, 300);
        assert!(!spec.round_corners);
        assert!(!spec.feather_edges);
        assert!(spec.crop_area.is_none());
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_builder_chain() {
        let spec = PrintSpec::new()
            .with_dpi(600)
            .with_corner_radius(15.0)
            .with_feather(10)
            .with_feather_curve(FeatherCurve::Smoothstep)
            .with_crop(CropArea::new(1, 2, 3, 4))
            .with_print_width(2.0);

        assert_eq!(spec.dpi, 600);
        assert!(spec.round_corners);
        assert!((spec.corner_radius_percent - 15.0).abs() < f32::EPSILON);
        assert_eq!(spec.feather_band(), Some(10));
        assert_eq!(spec.feather_curve, FeatherCurve::Smoothstep);
        assert_eq!(spec.crop_area, Some(CropArea::new(1, 2, 3, 4)));
        assert_eq!(spec.print_width_px(), Some(1200));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_dpi() {
        for dpi in [0, -1] {
            let err = PrintSpec::new().with_dpi(dpi).validate().unwrap_err();
            assert!(matches!(err, NormalizeError::InvalidSpec(_)), "dpi {dpi}");
        }
    }

    #[test]
    fn test_rejects_dpi_above_max() {
        assert!(PrintSpec::new().with_dpi(1200).validate().is_ok());
        assert!(PrintSpec::new().with_dpi(1201).validate().is_err());
    }

    #[test]
    fn test_corner_radius_range() {
        assert!(PrintSpec::new().with_corner_radius(0.0).validate().is_ok());
        assert!(PrintSpec::new().with_corner_radius(50.0).validate().is_ok());
        assert!(PrintSpec::new().with_corner_radius(50.5).validate().is_err());
        assert!(PrintSpec::new().with_corner_radius(-1.0).validate().is_err());
        assert!(
            PrintSpec::new()
                .with_corner_radius(f32::NAN)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_zero_feather_is_valid_noop() {
        let spec = PrintSpec::new().with_feather(0);
        assert!(spec.validate().is_ok());
        assert_eq!(spec.feather_band(), None);
    }

    #[test]
    fn test_negative_feather_rejected() {
        let err = PrintSpec::new().with_feather(-3).validate().unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidSpec(_)));
    }

    #[test]
    fn test_print_width_bounds() {
        assert!(PrintSpec::new().with_print_width(0.0).validate().is_err());
        assert!(PrintSpec::new().with_print_width(-2.0).validate().is_err());
        assert!(
            PrintSpec::new()
                .with_print_width(f32::INFINITY)
                .validate()
                .is_err()
        );
        // 100in at 300dpi = 30000px
        assert!(PrintSpec::new().with_print_width(100.0).validate().is_err());
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let spec: PrintSpec = serde_json::from_str(
            r#"{"dpi":300,"roundCorners":true,"cornerRadiusPercent":15,
                "cropArea":{"x":0,"y":0,"width":50,"height":40}}"#,
        )
        .unwrap();
        assert!(spec.round_corners);
        assert!(!spec.feather_edges);
        assert_eq!(spec.feather_curve, FeatherCurve::Linear);
        assert_eq!(spec.crop_area, Some(CropArea::new(0, 0, 50, 40)));
    }
}
