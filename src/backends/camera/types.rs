// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera sources

use std::sync::Arc;
use std::time::Instant;

/// Represents a camera device
#[derive(Debug, Clone)]
pub struct CameraDevice {
    /// Human readable name (GStreamer display name)
    pub name: String,
    /// Device class reported by the monitor (e.g. "Video/Source")
    pub device_class: String,
    /// GStreamer device handle, `None` selects `autovideosrc`
    pub handle: Option<gstreamer::Device>,
}

impl CameraDevice {
    /// Placeholder device that lets GStreamer pick the default source
    pub fn automatic() -> Self {
        Self {
            name: "Default camera".to_string(),
            device_class: "Video/Source".to_string(),
            handle: None,
        }
    }
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.device_class)
    }
}

/// Resolution advertised by a camera device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub framerate: Option<u32>,
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.framerate {
            Some(fps) => write!(f, "{}x{}@{}fps", self.width, self.height, fps),
            None => write!(f, "{}x{}", self.width, self.height),
        }
    }
}

/// A single frame from the camera
///
/// Pixel data is always tightly packed RGBA (`width * 4` bytes per row);
/// the pipeline strips any row padding before the frame leaves the appsink.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels
    pub data: Arc<[u8]>,
    /// Timestamp when frame was captured
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Create a frame from tightly packed RGBA bytes
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
            captured_at: Instant::now(),
        }
    }

    /// Expected byte length for this frame's dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// RGB triple at (x, y), clamped to the frame bounds
    pub fn pixel_rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        match self.data.get(idx..idx + 3) {
            Some(px) => (px[0], px[1], px[2]),
            None => (0, 0, 0),
        }
    }
}

/// Frame receiver type for preview streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for camera operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// GStreamer could not be initialised
    #[error("Backend not available: {0}")]
    NotAvailable(String),
    /// No camera devices found
    #[error("No camera devices found")]
    NoCameraFound,
    /// Requested device index does not exist
    #[error("Camera index {index} out of range ({count} cameras)")]
    DeviceNotFound { index: usize, count: usize },
    /// Failed to build or start the pipeline
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
}

impl From<gstreamer::glib::Error> for BackendError {
    fn from(err: gstreamer::glib::Error) -> Self {
        BackendError::NotAvailable(err.to_string())
    }
}

impl From<gstreamer::glib::BoolError> for BackendError {
    fn from(err: gstreamer::glib::BoolError) -> Self {
        BackendError::InitializationFailed(err.to_string())
    }
}
