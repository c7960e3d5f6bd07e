// SPDX-License-Identifier: GPL-3.0-only

//! Polaroid strip compositor
//!
//! ```text
//! Template ──▶ scale to canvas ──┐
//!                                ▼
//! Shot[i] ──▶ cover-fit crop ──▶ rounded clip ──▶ border stroke ──▶ Strip
//! ```
//!
//! Slots without a shot keep the template artwork untouched. The compositor
//! never fails because of missing shots, only because of undecodable input.

pub mod layout;
pub mod raster;

pub use layout::{CoverFit, Rect, SlotRect, SourceWindow, StripLayout, cover_fit};

use crate::assets;
use crate::constants::strip;
use crate::errors::CompositionError;
use crate::pipelines::photo::{Shot, decode_rgba, encode_png};
use image::RgbaImage;
use image::imageops::{self, FilterType as ResizeFilter};
use std::path::Path;
use tracing::{debug, info};

/// Composes captured shots onto the strip template
#[derive(Debug, Clone)]
pub struct StripCompositor {
    template: RgbaImage,
    layout: StripLayout,
}

impl StripCompositor {
    /// Create a compositor from decoded template pixels
    ///
    /// The template is stretched to the layout canvas if its size differs.
    pub fn new(template: RgbaImage, layout: StripLayout) -> Self {
        let template = if template.dimensions() != (layout.canvas_width, layout.canvas_height) {
            debug!(
                from_width = template.width(),
                from_height = template.height(),
                to_width = layout.canvas_width,
                to_height = layout.canvas_height,
                "Scaling template to canvas"
            );
            imageops::resize(
                &template,
                layout.canvas_width,
                layout.canvas_height,
                ResizeFilter::Triangle,
            )
        } else {
            template
        };
        Self { template, layout }
    }

    /// Create a compositor from encoded template bytes
    pub fn from_template_bytes(
        data: &[u8],
        layout: StripLayout,
    ) -> Result<Self, CompositionError> {
        let template =
            decode_rgba(data).map_err(|e| CompositionError::Template(e.to_string()))?;
        Ok(Self::new(template, layout))
    }

    /// Compositor for the embedded polaroid template
    pub fn canonical() -> Result<Self, CompositionError> {
        let data = assets::get(strip::TEMPLATE_ASSET).ok_or_else(|| {
            CompositionError::Template(format!("{} is not embedded", strip::TEMPLATE_ASSET))
        })?;
        Self::from_template_bytes(&data, StripLayout::canonical())
    }

    /// Compositor for a template image on disk, using the canonical layout
    pub fn from_path(path: &Path) -> Result<Self, CompositionError> {
        let data = std::fs::read(path)
            .map_err(|e| CompositionError::Template(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded custom strip template");
        Self::from_template_bytes(&data, StripLayout::canonical())
    }

    pub fn layout(&self) -> &StripLayout {
        &self.layout
    }

    /// Compose `shots` in slot order; `None` entries leave their slot blank
    pub fn compose(&self, shots: &[Option<Shot>]) -> Result<RgbaImage, CompositionError> {
        if shots.len() > self.layout.slots.len() {
            return Err(CompositionError::TooManyShots {
                slots: self.layout.slots.len(),
                shots: shots.len(),
            });
        }

        let mut canvas = self.template.clone();
        let mut drawn = 0;

        for (slot, shot) in shots.iter().enumerate() {
            let Some(shot) = shot else {
                continue;
            };
            let source = shot
                .decode()
                .map_err(|source| CompositionError::ShotDecode { slot, source })?;
            self.draw_slot(&mut canvas, slot, &source);
            drawn += 1;
        }

        debug!(drawn, slots = self.layout.slots.len(), "Strip composed");
        Ok(canvas)
    }

    /// Compose and encode as PNG
    pub fn compose_png(&self, shots: &[Option<Shot>]) -> Result<Vec<u8>, CompositionError> {
        let canvas = self.compose(shots)?;
        encode_png(&canvas).map_err(CompositionError::Encoding)
    }

    fn draw_slot(&self, canvas: &mut RgbaImage, slot: usize, source: &RgbaImage) {
        let Some(dest) = self.layout.photo_rect(slot) else {
            return;
        };
        if dest.is_empty() || source.width() == 0 || source.height() == 0 {
            return;
        }

        let fit = cover_fit(source.width(), source.height(), dest);
        let window = fit.visible_window(source.width(), source.height(), &dest);
        let visible =
            imageops::crop_imm(source, window.x, window.y, window.width, window.height).to_image();
        let scaled_width = window.placement.width.ceil().max(1.0) as u32;
        let scaled_height = window.placement.height.ceil().max(1.0) as u32;
        let scaled = imageops::resize(&visible, scaled_width, scaled_height, ResizeFilter::Triangle);

        let radius = self.layout.radius_for(&dest);
        raster::draw_clipped(canvas, &scaled, &window.placement, &dest, radius);
        raster::stroke_rounded_rect(
            canvas,
            &dest,
            radius,
            self.layout.stroke_color,
            self.layout.stroke_width,
        );
    }
}
