// SPDX-License-Identifier: MPL-2.0

//! GStreamer pipeline for camera capture
//!
//! ```text
//! camera source → videoconvert → appsink (RGBA) → frame channel
//! ```

use super::CameraSource;
use super::types::*;
use crate::constants::{camera, timing};
use futures::channel::mpsc;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::{VideoCapsBuilder, VideoFormat, VideoInfo};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Frames buffered between the appsink callback and the booth loop
const FRAME_CHANNEL_CAPACITY: usize = 4;

/// Live camera backed by a GStreamer pipeline
///
/// Owns the device for its whole lifetime; dropping it stops the pipeline
/// and releases the camera.
pub struct GstCamera {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
    receiver: FrameReceiver,
    device_name: String,
}

impl GstCamera {
    /// Build and start a pipeline for `device`
    pub fn open(device: &CameraDevice) -> BackendResult<Self> {
        info!(device = %device.name, "Creating camera pipeline");
        gstreamer::init()?;

        let source = match &device.handle {
            Some(handle) => handle.create_element(Some("source"))?,
            None => gstreamer::ElementFactory::make("autovideosrc")
                .name("source")
                .build()?,
        };
        let convert = gstreamer::ElementFactory::make("videoconvert").build()?;

        let caps = preview_caps();
        let appsink = AppSink::builder()
            .name("sink")
            .caps(&caps)
            .max_buffers(2)
            .drop(true)
            .sync(false)
            .build();

        let pipeline = gstreamer::Pipeline::new();
        pipeline.add_many([&source, &convert, appsink.upcast_ref()])?;
        gstreamer::Element::link_many([&source, &convert, appsink.upcast_ref()])?;

        let (sender, receiver) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        install_frame_callback(&appsink, sender);

        debug!("Setting pipeline to PLAYING state");
        pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            BackendError::InitializationFailed(format!("Failed to start pipeline: {}", e))
        })?;

        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");

        if let Some(message) = pending_error(&pipeline) {
            let _ = pipeline.set_state(gstreamer::State::Null);
            return Err(BackendError::InitializationFailed(message));
        }
        if state != gstreamer::State::Playing {
            warn!("Pipeline is not in PLAYING state yet");
        }

        info!(device = %device.name, "Camera pipeline started");

        Ok(Self {
            pipeline,
            appsink,
            receiver,
            device_name: device.name.clone(),
        })
    }
}

impl CameraSource for GstCamera {
    fn device_name(&self) -> &str {
        &self.device_name
    }

    fn poll_frame(&mut self) -> Option<CameraFrame> {
        if let Some(message) = pending_error(&self.pipeline) {
            error!(error = %message, "Camera pipeline error");
        }

        // Drain the channel so the newest frame wins
        let mut latest = None;
        while let Ok(frame) = self.receiver.try_recv() {
            latest = Some(frame);
        }
        latest
    }
}

impl Drop for GstCamera {
    fn drop(&mut self) {
        info!("Stopping camera pipeline");
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            warn!(error = %e, "Failed to stop pipeline");
            return;
        }
        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::STOP_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, "Camera pipeline stopped");
    }
}

/// First error message waiting on the pipeline bus, if any
/// RGBA at the preferred preview size first, any size as fallback
fn preview_caps() -> gstreamer::Caps {
    let mut caps = VideoCapsBuilder::new()
        .format(VideoFormat::Rgba)
        .width(camera::PREFERRED_WIDTH)
        .height(camera::PREFERRED_HEIGHT)
        .build();
    caps.make_mut().append(VideoCapsBuilder::new().format(VideoFormat::Rgba).build());
    caps
}

fn pending_error(pipeline: &gstreamer::Pipeline) -> Option<String> {
    let bus = pipeline.bus()?;
    let message = bus.pop_filtered(&[gstreamer::MessageType::Error])?;
    match message.view() {
        gstreamer::MessageView::Error(err) => Some(match err.debug() {
            Some(debug) => format!("{} ({})", err.error(), debug),
            None => err.error().to_string(),
        }),
        _ => None,
    }
}

fn install_frame_callback(appsink: &AppSink, frame_sender: FrameSender) {
    appsink.set_callbacks(
        gstreamer_app::AppSinkCallbacks::builder()
            .new_sample(move |appsink| {
                let frame_start = Instant::now();
                let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

                let sample = appsink
                    .pull_sample()
                    .map_err(|_| gstreamer::FlowError::Eos)?;
                let buffer = sample.buffer().ok_or(gstreamer::FlowError::Error)?;
                let caps = sample.caps().ok_or(gstreamer::FlowError::Error)?;
                let video_info = VideoInfo::from_caps(caps).map_err(|e| {
                    error!(frame = frame_num, error = ?e, "Failed to get video info");
                    gstreamer::FlowError::Error
                })?;
                let map = buffer.map_readable().map_err(|e| {
                    error!(frame = frame_num, error = ?e, "Failed to map buffer");
                    gstreamer::FlowError::Error
                })?;

                let width = video_info.width();
                let height = video_info.height();
                let stride = video_info.stride()[0] as usize;
                let row_bytes = width as usize * 4;

                // Strip row padding so frames are tightly packed
                let data: Arc<[u8]> = if stride == row_bytes {
                    Arc::from(map.as_slice())
                } else {
                    let mut packed = Vec::with_capacity(row_bytes * height as usize);
                    for row in map.as_slice().chunks(stride).take(height as usize) {
                        packed.extend_from_slice(&row[..row_bytes.min(row.len())]);
                    }
                    Arc::from(packed)
                };

                let frame = CameraFrame {
                    width,
                    height,
                    data,
                    captured_at: frame_start,
                };

                let mut sender = frame_sender.clone();
                if let Err(e) = sender.try_send(frame) {
                    if frame_num % 30 == 0 {
                        debug!(frame = frame_num, error = ?e, "Frame dropped (channel full)");
                    }
                } else if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                    debug!(
                        frame = frame_num,
                        width,
                        height,
                        copy_us = frame_start.elapsed().as_micros(),
                        "Frame delivered"
                    );
                }

                Ok(gstreamer::FlowSuccess::Ok)
            })
            .build(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_caps_prefer_hd() {
        gstreamer::init().unwrap();
        let caps = preview_caps();

        assert_eq!(caps.size(), 2);
        let preferred = caps.structure(0).unwrap();
        assert_eq!(preferred.get::<i32>("width").unwrap(), 1280);
        assert_eq!(preferred.get::<i32>("height").unwrap(), 720);
        assert_eq!(preferred.get::<&str>("format").unwrap(), "RGBA");

        let fallback = caps.structure(1).unwrap();
        assert!(!fallback.has_field("width"));
        assert_eq!(fallback.get::<&str>("format").unwrap(), "RGBA");
    }
}
