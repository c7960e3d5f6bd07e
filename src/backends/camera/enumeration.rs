// SPDX-License-Identifier: GPL-3.0-only

//! Camera discovery through the GStreamer device monitor

use super::types::*;
use gstreamer::prelude::*;
use tracing::{debug, info, warn};

/// Device class the monitor filters on
const VIDEO_SOURCE_CLASS: &str = "Video/Source";

/// Enumerate video capture devices
///
/// Returns an empty list (not an error) when the monitor finds nothing, so
/// callers can decide whether to fall back to `autovideosrc`.
pub fn enumerate_cameras() -> BackendResult<Vec<CameraDevice>> {
    gstreamer::init()?;

    let monitor = gstreamer::DeviceMonitor::new();
    if monitor.add_filter(Some(VIDEO_SOURCE_CLASS), None).is_none() {
        warn!("Device monitor rejected the video source filter");
    }

    monitor.start()?;
    let devices: Vec<CameraDevice> = monitor
        .devices()
        .into_iter()
        .map(|device| CameraDevice {
            name: device.display_name().to_string(),
            device_class: device.device_class().to_string(),
            handle: Some(device),
        })
        .collect();
    monitor.stop();

    info!(count = devices.len(), "Enumerated cameras");
    Ok(devices)
}

/// Resolutions advertised in a device's caps, highest first
pub fn device_formats(device: &CameraDevice) -> Vec<CameraFormat> {
    let Some(caps) = device.handle.as_ref().and_then(|d| d.caps()) else {
        return Vec::new();
    };

    let mut formats: Vec<CameraFormat> = Vec::new();
    for structure in caps.iter() {
        let (Ok(width), Ok(height)) = (structure.get::<i32>("width"), structure.get::<i32>("height"))
        else {
            // Ranges and lists are skipped; fixed sizes are what cameras report
            continue;
        };
        let framerate = structure
            .get::<gstreamer::Fraction>("framerate")
            .ok()
            .filter(|f| f.denom() > 0)
            .map(|f| (f.numer() / f.denom()) as u32);

        let format = CameraFormat {
            width: width as u32,
            height: height as u32,
            framerate,
        };

        match formats
            .iter_mut()
            .find(|f| f.width == format.width && f.height == format.height)
        {
            Some(existing) => {
                if format.framerate > existing.framerate {
                    existing.framerate = format.framerate;
                }
            }
            None => formats.push(format),
        }
    }

    formats.sort_by(|a, b| (b.width * b.height).cmp(&(a.width * a.height)));
    debug!(device = %device.name, count = formats.len(), "Device formats");
    formats
}

/// Pick a device by index, falling back to the automatic source when the
/// monitor reports no devices at all
pub fn select_camera(index: usize) -> BackendResult<CameraDevice> {
    let cameras = enumerate_cameras()?;

    if cameras.is_empty() {
        if index == 0 {
            info!("No cameras enumerated, using autovideosrc");
            return Ok(CameraDevice::automatic());
        }
        return Err(BackendError::NoCameraFound);
    }

    let count = cameras.len();
    cameras
        .into_iter()
        .nth(index)
        .ok_or(BackendError::DeviceNotFound { index, count })
}
