// SPDX-License-Identifier: MPL-2.0

//! Camera sources
//!
//! [`CameraSource`] is the seam between the booth and whatever produces
//! frames. [`GstCamera`] drives a real device through GStreamer,
//! [`SyntheticCamera`] renders frames in memory.

pub mod enumeration;
pub mod pipeline;
pub mod synthetic;
pub mod types;

pub use enumeration::{device_formats, enumerate_cameras, select_camera};
pub use pipeline::GstCamera;
pub use synthetic::SyntheticCamera;
pub use types::*;

use tracing::{error, info};

/// A live source of preview frames
///
/// The source is held exclusively by one booth for its whole lifetime and
/// released on drop.
pub trait CameraSource: Send {
    /// Human readable name of the device
    fn device_name(&self) -> &str;

    /// Newest frame produced since the previous poll, if any
    fn poll_frame(&mut self) -> Option<CameraFrame>;
}

/// Acquire the camera at `index`
///
/// Failure is logged and reported as `None`: a booth without a camera stays
/// inert instead of offering a retry flow.
pub fn acquire_camera(index: usize) -> Option<Box<dyn CameraSource>> {
    let result = select_camera(index).and_then(|device| GstCamera::open(&device));
    match result {
        Ok(camera) => {
            info!(device = camera.device_name(), "Camera acquired");
            Some(Box::new(camera))
        }
        Err(e) => {
            error!(index, error = %e, "Camera error");
            None
        }
    }
}
