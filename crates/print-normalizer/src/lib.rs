//! Print-ready image normalization for merchandise output.
//!
//! Turns a captured video frame (base64 data URL or raw bytes) into a PNG
//! asset with embedded DPI metadata. Optional steps: crop, background key,
//! print-size resample, corner rounding and edge feathering.

pub mod crop;
pub mod encode;
pub mod feather;
pub mod mask;
pub mod normalize;
pub mod profile;
pub mod resize;
pub mod source;
pub mod spec;

// Re-exports for convenience
pub use encode::RenderedAsset;
pub use normalize::normalize;
pub use profile::{PrintProfile, WorkerRequest};
pub use source::{ImageSource, SourceImage};
pub use spec::{BackgroundKey, CropArea, FeatherCurve, PrintSpec};

/// Highest DPI accepted for physical print output.
pub const MAX_DPI: i32 = 1200;

/// Upper bound on either output dimension after a print-size resample.
pub const MAX_OUTPUT_DIMENSION: u32 = 20_000;

/// Errors that can occur while normalizing an image.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Failed to decode source image: {0}")]
    Decode(String),

    #[error("Invalid print spec: {0}")]
    InvalidSpec(String),

    #[error(
        "Crop area {x},{y} {width}x{height} does not fit source image {source_width}x{source_height}"
    )]
    InvalidCropArea {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        source_width: u32,
        source_height: u32,
    },

    #[error("Failed to encode PNG: {0}")]
    Encode(String),
}

/// Stable error category, for callers that report failures to an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Decode,
    InvalidSpec,
    InvalidCropArea,
    Encode,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::InvalidSpec => "invalid_spec",
            Self::InvalidCropArea => "invalid_crop_area",
            Self::Encode => "encode",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NormalizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::Decode,
            Self::InvalidSpec(_) => ErrorKind::InvalidSpec,
            Self::InvalidCropArea { .. } => ErrorKind::InvalidCropArea,
            Self::Encode(_) => ErrorKind::Encode,
        }
    }

    /// True when the input image itself was the problem, as opposed to
    /// the configuration it was processed with.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result type alias for normalizer operations.
pub type Result<T> = std::result::Result<T, NormalizeError>;
