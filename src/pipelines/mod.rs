// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for shots and strips
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │     Shot     │
//! │   (RGBA)     │     │  - Filter bake-in │     │    (PNG)     │
//! │              │     │  - PNG encoding   │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │  Shots (≤3)  │ ──▶ │  Strip Compositor │ ──▶ │    Strip     │
//! │  + Template  │     │  - Cover-fit      │     │    (PNG)     │
//! │              │     │  - Rounded clip   │     │              │
//! │              │     │  - Border stroke  │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Frame capture, filters and encoding
//! - [`strip`]: Polaroid strip layout and compositing

pub mod photo;
pub mod strip;
