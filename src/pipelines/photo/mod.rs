// SPDX-License-Identifier: MPL-2.0

//! Shot capture pipeline
//!
//! ```text
//! Camera frame (RGBA) → Filter bake-in → PNG encoding → Shot
//!       ↓
//! Preview continues uninterrupted
//! ```
//!
//! A shot stores encoded pixels with the filter already applied, so changing
//! the active filter later never alters shots that were already taken.

pub mod encoding;
pub mod filters;

pub use encoding::{PNG_MIME, decode_rgba, encode_png};
pub use filters::FilterType;

use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use chrono::{DateTime, Local};
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// One captured still, stored at a fixed strip position
#[derive(Debug, Clone)]
pub struct Shot {
    /// Unique per capture, so a retaken slot is distinguishable from the old one
    pub id: Uuid,
    /// Encoded image bytes (PNG for camera captures)
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    /// Filter baked into `data`
    pub filter: FilterType,
    pub captured_at: DateTime<Local>,
}

impl Shot {
    /// Wrap already-encoded image bytes (e.g. a file loaded from disk)
    pub fn from_encoded(data: Vec<u8>) -> Result<Self, image::ImageError> {
        let (width, height) = encoding::probe_dimensions(&data)?;
        Ok(Self {
            id: Uuid::new_v4(),
            data: Arc::from(data),
            width,
            height,
            filter: FilterType::Normal,
            captured_at: Local::now(),
        })
    }

    /// Decode the stored image into RGBA pixels
    pub fn decode(&self) -> Result<RgbaImage, image::ImageError> {
        decode_rgba(&self.data)
    }
}

/// Turns camera frames into shots
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoPipeline;

impl PhotoPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Bake `filter` into a copy of `frame` and encode it
    pub fn capture(&self, frame: &CameraFrame, filter: FilterType) -> Result<Shot, PhotoError> {
        let expected = frame.expected_len();
        if frame.data.len() != expected {
            return Err(PhotoError::InvalidFrame {
                width: frame.width,
                height: frame.height,
                expected,
                actual: frame.data.len(),
            });
        }

        let mut pixels = frame.data.to_vec();
        filters::apply_filter_rgba(&mut pixels, filter);
        debug!(filter = %filter, "Filter baked into frame");

        let image = RgbaImage::from_raw(frame.width, frame.height, pixels).ok_or(
            PhotoError::InvalidFrame {
                width: frame.width,
                height: frame.height,
                expected,
                actual: frame.data.len(),
            },
        )?;
        let data = encode_png(&image)?;

        info!(
            width = frame.width,
            height = frame.height,
            filter = %filter,
            size_kb = data.len() / 1024,
            "Shot captured"
        );

        Ok(Shot {
            id: Uuid::new_v4(),
            data: Arc::from(data),
            width: frame.width,
            height: frame.height,
            filter,
            captured_at: Local::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32, rgb: [u8; 3]) -> CameraFrame {
        let mut data = Vec::new();
        for _ in 0..width * height {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        CameraFrame::from_rgba(width, height, data)
    }

    #[test]
    fn test_capture_bakes_filter() {
        let frame = solid_frame(4, 2, [255, 0, 0]);
        let shot = PhotoPipeline::new()
            .capture(&frame, FilterType::Grayscale)
            .unwrap();

        assert_eq!((shot.width, shot.height), (4, 2));
        assert_eq!(shot.filter, FilterType::Grayscale);
        let decoded = shot.decode().unwrap();
        assert_eq!(decoded.get_pixel(3, 1).0, [54, 54, 54, 255]);
    }

    #[test]
    fn test_capture_rejects_short_buffer() {
        let frame = CameraFrame::from_rgba(4, 4, vec![0; 10]);
        let err = PhotoPipeline::new()
            .capture(&frame, FilterType::Normal)
            .unwrap_err();
        assert!(matches!(err, PhotoError::InvalidFrame { actual: 10, .. }));
    }

    #[test]
    fn test_shot_ids_are_unique() {
        let frame = solid_frame(1, 1, [0, 0, 0]);
        let pipeline = PhotoPipeline::new();
        let a = pipeline.capture(&frame, FilterType::Normal).unwrap();
        let b = pipeline.capture(&frame, FilterType::Normal).unwrap();
        assert_ne!(a.id, b.id);
    }
}
