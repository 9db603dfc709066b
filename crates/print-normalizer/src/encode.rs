//! PNG encoding with physical resolution metadata.
//!
//! The DPI tag is written as a `pHYs` chunk in pixels per metre, the
//! unit print tooling reads when computing physical size.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use png::{BitDepth, ColorType, Compression, Encoder, PixelDimensions, Unit};
use tracing::debug;

use crate::{NormalizeError, Result};

const METRES_PER_INCH: f64 = 0.0254;

/// An encoded print-ready asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAsset {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
    dpi: u32,
}

impl RenderedAsset {
    /// Encoded PNG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of the encoded PNG in bytes.
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }

    /// DPI written to the `pHYs` chunk.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Physical print size in inches at the embedded DPI.
    pub fn print_size_in(&self) -> (f64, f64) {
        let dpi = f64::from(self.dpi);
        (f64::from(self.width) / dpi, f64::from(self.height) / dpi)
    }

    /// `data:image/png;base64,...` for callers that forward the asset inline.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", STANDARD.encode(&self.bytes))
    }
}

/// Convert DPI to the pixels-per-metre value stored in `pHYs`.
pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (f64::from(dpi) / METRES_PER_INCH).round() as u32
}

/// Convert a `pHYs` pixels-per-metre value back to DPI.
pub fn ppm_to_dpi(ppm: u32) -> u32 {
    (f64::from(ppm) * METRES_PER_INCH).round() as u32
}

/// Encode `img` as 8-bit RGBA PNG tagged with `dpi` on both axes.
pub fn encode_png(img: &RgbaImage, dpi: u32) -> Result<RenderedAsset> {
    let (width, height) = img.dimensions();
    let ppm = dpi_to_ppm(dpi);

    let mut bytes = Vec::new();
    {
        let mut encoder = Encoder::new(&mut bytes, width, height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        encoder.set_compression(Compression::Default);
        encoder.set_pixel_dims(Some(PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: Unit::Meter,
        }));

        let mut writer = encoder.write_header().map_err(encode_error)?;
        writer.write_image_data(img.as_raw()).map_err(encode_error)?;
        writer.finish().map_err(encode_error)?;
    }

    debug!(width, height, dpi, ppm, byte_size = bytes.len(), "Encoded PNG");

    Ok(RenderedAsset {
        bytes,
        width,
        height,
        dpi,
    })
}

fn encode_error(err: png::EncodingError) -> NormalizeError {
    NormalizeError::Encode(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn read_pixel_dims(bytes: &[u8]) -> Option<PixelDimensions> {
        let decoder = png::Decoder::new(Cursor::new(bytes));
        let reader = decoder.read_info().unwrap();
        reader.info().pixel_dims
    }

    #[test]
    fn test_dpi_ppm_round_trip_common_values() {
        assert_eq!(dpi_to_ppm(300), 11811);
        assert_eq!(dpi_to_ppm(72), 2835);
        for dpi in [72, 150, 300, 600, 1200] {
            assert_eq!(ppm_to_dpi(dpi_to_ppm(dpi)), dpi);
        }
    }

    #[test]
    fn test_encode_writes_phys_chunk() {
        let img = RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 4]));
        let asset = encode_png(&img, 300).unwrap();

        let dims = read_pixel_dims(asset.bytes()).expect("pHYs chunk missing");
        assert_eq!(dims.unit, Unit::Meter);
        assert_eq!(dims.xppu, 11811);
        assert_eq!(dims.yppu, 11811);
    }

    #[test]
    fn test_encode_keeps_alpha() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 1, Rgba([10, 20, 30, 0]));
        let asset = encode_png(&img, 300).unwrap();

        let decoded = image::load_from_memory(asset.bytes()).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_asset_metadata() {
        let img = RgbaImage::new(600, 300);
        let asset = encode_png(&img, 300).unwrap();
        assert_eq!((asset.width(), asset.height(), asset.dpi()), (600, 300, 300));
        assert_eq!(asset.byte_size(), asset.bytes().len());
        assert_eq!(asset.print_size_in(), (2.0, 1.0));
    }

    #[test]
    fn test_data_url_prefix() {
        let asset = encode_png(&RgbaImage::new(1, 1), 300).unwrap();
        let url = asset.to_data_url();
        assert!(url.starts_with("data:image/png;base64,iVBOR"));
    }
}
