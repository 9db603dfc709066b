//! Named print profiles.
//!
//! Quality parameters (DPI, corner radius, feathering) are fixed per
//! profile. Requests coming from the worker portal can only choose a crop;
//! they never reach the quality knobs.

use serde::{Deserialize, Serialize};

use crate::spec::{BackgroundKey, CropArea, FeatherCurve, PrintSpec};

/// A fixed set of quality parameters identified by name.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintProfile {
    pub name: String,
    pub dpi: i32,
    pub round_corners: bool,
    pub corner_radius_percent: f32,
    pub feather_edges: bool,
    pub feather_radius_px: i32,
    pub feather_curve: FeatherCurve,
    pub background_key: Option<BackgroundKey>,
    pub print_width_in: Option<f32>,
}

/// What a worker is allowed to choose for a single print.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequest {
    pub crop_area: Option<CropArea>,
}

/// Names of the built-in profiles, in display order.
pub const BUILTIN_PROFILES: &[&str] = &["standard", "soft-edge", "sticker"];

impl PrintProfile {
    /// Plain 300 dpi output with no edge effects.
    pub fn standard() -> Self {
        Self {
            name: "standard".into(),
            dpi: 300,
            round_corners: false,
            corner_radius_percent: 0.0,
            feather_edges: false,
            feather_radius_px: 0,
            feather_curve: FeatherCurve::Linear,
            background_key: None,
            print_width_in: None,
        }
    }

    /// Rounded corners and a 10px feather, for apparel prints.
    pub fn soft_edge() -> Self {
        Self {
            name: "soft-edge".into(),
            round_corners: true,
            corner_radius_percent: 15.0,
            feather_edges: true,
            feather_radius_px: 10,
            ..Self::standard()
        }
    }

    /// Rounded die-cut shape with a white background keyed out.
    pub fn sticker() -> Self {
        Self {
            name: "sticker".into(),
            round_corners: true,
            corner_radius_percent: 15.0,
            background_key: Some(BackgroundKey::white(12)),
            ..Self::standard()
        }
    }

    /// Look up a built-in profile. Names are case-insensitive.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::standard()),
            "soft-edge" | "soft_edge" => Some(Self::soft_edge()),
            "sticker" => Some(Self::sticker()),
            _ => None,
        }
    }

    /// Build the `PrintSpec` for one print. Only the crop comes from the request.
    pub fn spec_for(&self, request: &WorkerRequest) -> PrintSpec {
        PrintSpec {
            dpi: self.dpi,
            round_corners: self.round_corners,
            corner_radius_percent: self.corner_radius_percent,
            feather_edges: self.feather_edges,
            feather_radius_px: self.feather_radius_px,
            feather_curve: self.feather_curve,
            crop_area: request.crop_area,
            background_key: self.background_key,
            print_width_in: self.print_width_in,
        }
    }
}

impl Default for PrintProfile {
    fn default() -> Self {
        Self::standard()
    }
}
