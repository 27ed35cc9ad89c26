//! Conversion between canvas rasters and serialized image strings.
//!
//! Drawings are stored as PNG data URLs (`data:image/png;base64,...`). The
//! canvas is always flattened onto white before encoding, so stored images
//! are fully opaque.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, RgbImage};
use tiny_skia::{IntSize, Pixmap};

/// Prefix of every data URL written by [`PngDataUrlCodec`].
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Serializes rasters to strings and back.
pub trait ImageCodec {
    fn encode(&self, pixmap: &Pixmap) -> Result<String, CodecError>;
    fn decode(&self, data: &str) -> Result<Pixmap, CodecError>;
}

/// PNG encoded as a base64 data URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngDataUrlCodec;

impl ImageCodec for PngDataUrlCodec {
    fn encode(&self, pixmap: &Pixmap) -> Result<String, CodecError> {
        let rgb = flatten_on_white(pixmap)?;
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(&bytes)))
    }

    fn decode(&self, data: &str) -> Result<Pixmap, CodecError> {
        let rgba = decode_data_url(data)?.into_rgba8();
        let (width, height) = rgba.dimensions();
        let size = IntSize::from_wh(width, height).ok_or(CodecError::EmptyImage)?;

        let mut pixels = rgba.into_raw();
        for px in pixels.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            for c in &mut px[..3] {
                *c = premultiply(*c, a);
            }
        }
        Pixmap::from_vec(pixels, size).ok_or(CodecError::EmptyImage)
    }
}

/// Decode any base64 image data URL into an image.
pub fn decode_data_url(data: &str) -> Result<DynamicImage, CodecError> {
    let payload = data
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .ok_or(CodecError::NotADataUrl)?;
    let bytes = STANDARD.decode(payload.trim())?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Composite a premultiplied RGBA pixmap over opaque white.
pub fn flatten_on_white(pixmap: &Pixmap) -> Result<RgbImage, CodecError> {
    let mut rgb = Vec::with_capacity(pixmap.data().len() / 4 * 3);
    for px in pixmap.data().chunks_exact(4) {
        let blank = 255 - px[3];
        rgb.extend(px[..3].iter().map(|c| c.saturating_add(blank)));
    }
    RgbImage::from_raw(pixmap.width(), pixmap.height(), rgb).ok_or(CodecError::EmptyImage)
}

fn premultiply(channel: u8, alpha: u16) -> u8 {
    let value = (u16::from(channel) * alpha + 127) / 255;
    u8::try_from(value).unwrap_or(u8::MAX)
}

/// Errors raised while encoding or decoding drawings.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The string is not a base64 data URL
    #[error("Not a base64 image data URL")]
    NotADataUrl,

    /// Invalid base64 payload
    #[error("Invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// PNG encode or image decode failure
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Zero-sized or inconsistent image buffer
    #[error("Image has no pixels")]
    EmptyImage,
}
