// SPDX-License-Identifier: GPL-3.0-only

//! Still image encoding
//!
//! Shots and strips are stored as PNG: lossless, so a filter baked in at
//! capture time survives the round trip through the compositor unchanged.

use image::{ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// MIME type of everything this module encodes
pub const PNG_MIME: &str = "image/png";

/// Encode RGBA pixels as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    let data = buffer.into_inner();
    debug!(
        width = image.width(),
        height = image.height(),
        size_kb = data.len() / 1024,
        "Encoded PNG"
    );
    Ok(data)
}

/// Decode any supported still image into RGBA pixels
pub fn decode_rgba(data: &[u8]) -> Result<RgbaImage, image::ImageError> {
    Ok(image::load_from_memory(data)?.to_rgba8())
}

/// Read image dimensions from the header without decoding pixels
pub fn probe_dimensions(data: &[u8]) -> Result<(u32, u32), image::ImageError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_dimensions()
}

/// MIME type guessed from the image header
pub fn guess_mime(data: &[u8]) -> Option<&'static str> {
    match image::guess_format(data).ok()? {
        ImageFormat::Png => Some(PNG_MIME),
        ImageFormat::Jpeg => Some("image/jpeg"),
        _ => None,
    }
}
