// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for camera capture
//!
//! The backend layer abstracts hardware access so the booth sees the same
//! frame source whether it runs against a real webcam or a synthetic
//! pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Booth (app)                  │
//! └────────────────────┬────────────────────────┘
//!                      │ CameraSource
//! ┌────────────────────┴────────────────────────┐
//! │  ┌─────────────────┐  ┌──────────────────┐  │
//! │  │ GStreamer camera│  │ Synthetic source │  │
//! │  └─────────────────┘  └──────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```

pub mod camera;
