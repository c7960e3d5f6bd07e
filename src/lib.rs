// SPDX-License-Identifier: MPL-2.0

//! Photobooth - a three-shot photo booth with polaroid strips
//!
//! This library provides the core functionality of the booth: camera
//! capture, live filters, strip compositing, and delivery of the finished
//! strip to disk or by email through a small SMTP relay.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Booth controller and capture session state machine
//! - [`backends`]: Camera sources (GStreamer and synthetic)
//! - [`pipelines`]: Shot capture with filters, strip compositing
//! - [`delivery`]: Relay client used to email strips
//! - [`relay`]: HTTP mail relay service
//! - [`media`]: Data URI transport encoding
//! - [`terminal`]: Terminal front end
//! - [`config`]: Booth configuration file
//! - [`storage`]: Saved strip files
//!
//! # Example
//!
//! ```ignore
//! // Booth in the terminal, relay in another shell:
//! // photobooth booth --synthetic
//! // SMTP_HOST=smtp.example.com photobooth relay
//! ```

pub mod app;
pub mod assets;
pub mod backends;
pub mod config;
pub mod constants;
pub mod delivery;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod relay;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{Booth, BoothEvent, BoothMode, BoothSettings, CaptureSession, SendStatus};
pub use config::BoothConfig;
pub use errors::{AppError, AppResult};
pub use pipelines::photo::{FilterType, Shot};
pub use pipelines::strip::StripCompositor;
