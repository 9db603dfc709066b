//! The normalization pipeline.
//!
//! decode -> crop -> background key -> print-size resample
//! -> corner rounding -> edge feathering -> PNG + DPI.
//!
//! Every step is a pure function of the previous buffer and the `PrintSpec`, so
//! the same input and spec always produce byte-identical output.

use tracing::debug;

use crate::encode::{self, RenderedAsset};
use crate::source::{ImageSource, SourceImage};
use crate::spec::PrintSpec;
use crate::{MAX_OUTPUT_DIMENSION, NormalizeError, Result, crop, feather, mask, resize};

/// Convert `source` into a print-ready PNG according to `spec`.
///
/// The spec is validated before any decoding work is done.
pub fn normalize<'a>(
    source: impl Into<ImageSource<'a>>,
    spec: &PrintSpec,
) -> Result<RenderedAsset> {
    spec.validate()?;
    let image = SourceImage::decode(source.into())?;
    render(image, spec)
}

/// Run the pipeline on an already-decoded image.
pub fn render(image: SourceImage, spec: &PrintSpec) -> Result<RenderedAsset> {
    spec.validate()?;

    let (source_width, source_height) = (image.width(), image.height());
    let mut canvas = image.into_pixels();

    if let Some(area) = &spec.crop_area {
        canvas = crop::crop(&canvas, area)?;
    }

    if let Some(key) = &spec.background_key {
        mask::apply_background_key(&mut canvas, key);
    }

    if let Some(target_width) = spec.print_width_px() {
        let (w, h) = canvas.dimensions();
        let target_height = (f64::from(h) * f64::from(target_width) / f64::from(w)).round();
        if target_height > f64::from(MAX_OUTPUT_DIMENSION) {
            return Err(NormalizeError::InvalidSpec(format!(
                "print width of {target_width}px would make the image {target_height}px tall, limit is {MAX_OUTPUT_DIMENSION}"
            )));
        }
        canvas = resize::resize_to_width(canvas, target_width);
    }

    if spec.round_corners {
        let (w, h) = canvas.dimensions();
        let radius = mask::corner_radius_px(spec.corner_radius_percent, w, h);
        mask::round_corners(&mut canvas, radius);
    }

    if let Some(band) = spec.feather_band() {
        feather::feather_edges(&mut canvas, band, spec.feather_curve);
    }

    // validate() guarantees dpi is in 1..=MAX_DPI
    let asset = encode::encode_png(&canvas, spec.dpi as u32)?;

    debug!(
        source_width,
        source_height,
        width = asset.width(),
        height = asset.height(),
        byte_size = asset.byte_size(),
        dpi = asset.dpi(),
        "Normalized image for print"
    );

    Ok(asset)
}
