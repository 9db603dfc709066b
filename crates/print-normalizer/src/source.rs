//! Source image decoding from data URLs, bare base64 or raw bytes.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use tracing::debug;

use crate::{NormalizeError, Result};

/// Raw image input as it arrives from an order record.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// `data:image/png;base64,...`
    DataUrl(&'a str),
    /// Base64 payload without the `data:` prefix.
    Base64(&'a str),
    /// Encoded image bytes (PNG, JPEG, WebP, ...).
    Bytes(&'a [u8]),
}

impl<'a> ImageSource<'a> {
    /// Classify a text payload as a data URL or bare base64.
    pub fn from_text(text: &'a str) -> Self {
        if text.trim_start().starts_with("data:") {
            Self::DataUrl(text)
        } else {
            Self::Base64(text)
        }
    }

    fn into_bytes(self) -> Result<std::borrow::Cow<'a, [u8]>> {
        match self {
            Self::Bytes(bytes) => Ok(std::borrow::Cow::Borrowed(bytes)),
            Self::Base64(text) => decode_base64(text).map(std::borrow::Cow::Owned),
            Self::DataUrl(url) => {
                let payload = data_url_payload(url)?;
                decode_base64(payload).map(std::borrow::Cow::Owned)
            }
        }
    }
}

impl<'a> From<&'a [u8]> for ImageSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for ImageSource<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for ImageSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::from_text(text)
    }
}

/// A decoded RGBA raster. Width and height are always non-zero.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    /// Decode `source` into RGBA8.
    ///
    /// Existing alpha is preserved; images without alpha become opaque.
    pub fn decode(source: ImageSource<'_>) -> Result<Self> {
        let bytes = source.into_bytes()?;
        if bytes.is_empty() {
            return Err(NormalizeError::Decode("image payload is empty".into()));
        }

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| NormalizeError::Decode(e.to_string()))?;
        Self::from_rgba(decoded.to_rgba8())
    }

    /// Wrap an already-decoded buffer.
    pub fn from_rgba(pixels: RgbaImage) -> Result<Self> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(NormalizeError::Decode(format!(
                "image has no pixels ({width}x{height})"
            )));
        }
        debug!(width, height, "Decoded source image");
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

fn data_url_payload(url: &str) -> Result<&str> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| NormalizeError::Decode("not a data URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| NormalizeError::Decode("data URL has no payload".into()))?;

    if !header.ends_with(";base64") {
        return Err(NormalizeError::Decode(format!(
            "data URL is not base64 encoded ({header})"
        )));
    }
    if !header.is_empty() && !header.starts_with("image/") {
        return Err(NormalizeError::Decode(format!(
            "data URL is not an image ({header})"
        )));
    }
    Ok(payload)
}

fn decode_base64(text: &str) -> Result<Vec<u8>> {
    // Payloads copied out of JSON or form bodies often carry line breaks.
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| NormalizeError::Decode(format!("invalid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Luma, Rgba};
    use std::io::Cursor;

    fn encode(img: image::DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, format).unwrap();
        cursor.into_inner()
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 128]));
        encode(image::DynamicImage::ImageRgba8(img), ImageFormat::Png)
    }

    #[test]
    fn test_decode_raw_png_preserves_alpha() {
        let bytes = png_bytes(4, 3);
        let img = SourceImage::decode(ImageSource::Bytes(&bytes)).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
        assert_eq!(*img.pixels().get_pixel(2, 1), Rgba([10, 20, 30, 128]));
    }

    #[test]
    fn test_decode_grayscale_gains_opaque_alpha() {
        let gray = image::GrayImage::from_pixel(2, 2, Luma([77]));
        let bytes = encode(image::DynamicImage::ImageLuma8(gray), ImageFormat::Png);
        let img = SourceImage::decode(ImageSource::Bytes(&bytes)).unwrap();
        assert_eq!(*img.pixels().get_pixel(0, 0), Rgba([77, 77, 77, 255]));
    }

    #[test]
    fn test_decode_data_url() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(5, 5)));
        let img = SourceImage::decode(ImageSource::from_text(&url)).unwrap();
        assert_eq!(img.width(), 5);
    }

    #[test]
    fn test_decode_bare_base64_with_line_breaks() {
        let encoded = STANDARD.encode(png_bytes(3, 2));
        let (head, tail) = encoded.split_at(encoded.len() / 2);
        let wrapped = format!("{head}\n{tail}\n");
        let img = SourceImage::decode(ImageSource::from_text(&wrapped)).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
    }

    #[test]
    fn test_non_image_bytes_is_decode_error() {
        let err = SourceImage::decode(ImageSource::Bytes(b"not an image")).unwrap_err();
        assert!(matches!(err, NormalizeError::Decode(_)));
    }

    #[test]
    fn test_empty_payload_is_decode_error() {
        let err = SourceImage::decode(ImageSource::Bytes(&[])).unwrap_err();
        assert!(matches!(err, NormalizeError::Decode(_)));
    }

    #[test]
    fn test_invalid_base64_is_decode_error() {
        let err = SourceImage::decode(ImageSource::Base64("@@@###")).unwrap_err();
        assert!(matches!(err, NormalizeError::Decode(_)));
    }

    #[test]
    fn test_data_url_without_base64_marker_rejected() {
        let err = SourceImage::decode(ImageSource::DataUrl("data:image/png,abcd")).unwrap_err();
        assert!(matches!(err, NormalizeError::Decode(_)));
    }

    #[test]
    fn test_data_url_with_non_image_type_rejected() {
        let err =
            SourceImage::decode(ImageSource::DataUrl("data:text/plain;base64,aGVsbG8=")).unwrap_err();
        assert!(matches!(err, NormalizeError::Decode(_)));
    }

    #[test]
    fn test_zero_sized_buffer_rejected() {
        let err = SourceImage::from_rgba(RgbaImage::new(0, 5)).unwrap_err();
        assert!(matches!(err, NormalizeError::Decode(_)));
    }
}
