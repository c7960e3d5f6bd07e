// SPDX-License-Identifier: GPL-3.0-only

//! Strip geometry: slot regions, insets, cover-fit scaling

use crate::constants::strip;

/// Integer region on the template where one shot goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SlotRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region shrunk by `padding` on every side (never negative)
    pub fn inset(&self, padding: u32) -> Rect {
        let width = self.width.saturating_sub(padding * 2);
        let height = self.height.saturating_sub(padding * 2);
        Rect {
            x: (self.x + padding) as f32,
            y: (self.y + padding) as f32,
            width: width as f32,
            height: height as f32,
        }
    }
}

/// Floating point rectangle in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Placement of a source image scaled to cover a destination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to the source
    pub scale: f32,
    /// Where the scaled source lands; overflows the destination equally on
    /// both sides of the cropped axis
    pub draw: Rect,
}

impl CoverFit {
    /// Smallest whole-pixel source region that covers `dest`, and where that
    /// region lands on the canvas
    ///
    /// Only this region needs resampling, so the scaled buffer stays close to
    /// the destination size whatever the source aspect ratio.
    pub fn visible_window(&self, src_width: u32, src_height: u32, dest: &Rect) -> SourceWindow {
        let (x0, x1) = visible_span(dest.x - self.draw.x, dest.width, self.scale, src_width);
        let (y0, y1) = visible_span(dest.y - self.draw.y, dest.height, self.scale, src_height);
        SourceWindow {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
            placement: Rect {
                x: self.draw.x + x0 as f32 * self.scale,
                y: self.draw.y + y0 as f32 * self.scale,
                width: (x1 - x0) as f32 * self.scale,
                height: (y1 - y0) as f32 * self.scale,
            },
        }
    }
}

/// Source pixels backing the visible part of a cover-fit placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Canvas rectangle the window covers once scaled
    pub placement: Rect,
}

/// Half-open source pixel range `[start, end)` seen through `extent` canvas
/// pixels starting `offset` into the scaled source; never empty
fn visible_span(offset: f32, extent: f32, scale: f32, size: u32) -> (u32, u32) {
    let size = size.max(1);
    if scale <= 0.0 {
        return (0, size);
    }
    let start = ((offset / scale).floor().max(0.0) as u32).min(size - 1);
    let end = (((offset + extent) / scale).ceil().max(0.0) as u32).clamp(start + 1, size);
    (start, end)
}

/// Scale `src_width x src_height` uniformly so it fully covers `dest`,
/// centring the overflow
pub fn cover_fit(src_width: u32, src_height: u32, dest: Rect) -> CoverFit {
    let src_width = src_width.max(1) as f32;
    let src_height = src_height.max(1) as f32;

    let scale = (dest.width / src_width).max(dest.height / src_height);
    let width = src_width * scale;
    let height = src_height * scale;

    CoverFit {
        scale,
        draw: Rect {
            x: dest.x - (width - dest.width) / 2.0,
            y: dest.y - (height - dest.height) / 2.0,
            width,
            height,
        },
    }
}

/// Fixed strip layout matching one template artwork
#[derive(Debug, Clone, PartialEq)]
pub struct StripLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub slots: Vec<SlotRect>,
    pub padding: u32,
    pub corner_radius: f32,
    pub stroke_color: [u8; 4],
    pub stroke_width: f32,
}

impl StripLayout {
    /// Layout of the bundled polaroid template
    pub fn canonical() -> Self {
        Self {
            canvas_width: strip::CANVAS_WIDTH,
            canvas_height: strip::CANVAS_HEIGHT,
            slots: strip::SLOTS
                .iter()
                .map(|&(x, y, w, h)| SlotRect::new(x, y, w, h))
                .collect(),
            padding: strip::PADDING,
            corner_radius: strip::CORNER_RADIUS,
            stroke_color: strip::STROKE_COLOR,
            stroke_width: strip::STROKE_WIDTH,
        }
    }

    /// Destination rectangle of the photo in `slot`
    pub fn photo_rect(&self, slot: usize) -> Option<Rect> {
        self.slots.get(slot).map(|s| s.inset(self.padding))
    }

    /// Corner radius for `rect`, clamped to half its shorter side
    pub fn radius_for(&self, rect: &Rect) -> f32 {
        self.corner_radius
            .min(rect.width / 2.0)
            .min(rect.height / 2.0)
            .max(0.0)
    }
}

impl Default for StripLayout {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_photo_rects() {
        let layout = StripLayout::canonical();
        let rect = layout.photo_rect(0).unwrap();
        assert_eq!(
            rect,
            Rect {
                x: 170.0,
                y: 174.0,
                width: 1315.0,
                height: 721.0
            }
        );
        assert_eq!(layout.photo_rect(2).unwrap().y, 1809.0);
        assert!(layout.photo_rect(3).is_none());
    }

    #[test]
    fn test_inset_never_negative() {
        let rect = SlotRect::new(10, 10, 30, 100).inset(20);
        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 60.0);
        assert!(rect.is_empty());
    }

    #[test]
    fn test_visible_window_of_extreme_aspect_stays_small() {
        let dest = StripLayout::canonical().photo_rect(0).unwrap();
        let fit = cover_fit(1, 10_000, dest);
        let window = fit.visible_window(1, 10_000, &dest);

        assert_eq!(window.width, 1);
        assert!(window.height <= 2, "{:?}", window);
        assert!(window.y > 4_000 && window.y < 6_000);
        // At most one source pixel of overhang per side
        assert!(window.placement.height <= dest.height + 2.0 * fit.scale);
        assert!(window.placement.y <= dest.y);
        assert!(window.placement.y + window.placement.height >= dest.y + dest.height);
    }

    #[test]
    fn test_visible_window_covers_dest() {
        let dest = Rect {
            x: 10.0,
            y: 20.0,
            width: 40.0,
            height: 10.0,
        };
        let fit = cover_fit(20, 20, dest);
        let window = fit.visible_window(20, 20, &dest);

        // Rows 7.5..12.5 are visible, whole pixels 7..13
        assert_eq!((window.x, window.width), (0, 20));
        assert_eq!((window.y, window.height), (7, 6));
        assert_eq!(window.placement.x, 10.0);
        assert_eq!(window.placement.width, 40.0);
        assert_eq!(window.placement.y, 19.0);
        assert_eq!(window.placement.height, 12.0);
    }

    #[test]
    fn test_cover_fit_crops_wide_source() {
        // 16:9 source into a 1:1 box: height decides, width overflows
        let dest = Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let fit = cover_fit(160, 90, dest);
        assert!((fit.scale - 100.0 / 90.0).abs() < 1e-5);
        assert!((fit.draw.height - 100.0).abs() < 1e-3);
        assert!(fit.draw.width > 100.0);
        // overflow split evenly
        let overflow = fit.draw.width - 100.0;
        assert!((fit.draw.x + overflow / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_cover_fit_crops_tall_source() {
        let dest = Rect {
            x: 50.0,
            y: 20.0,
            width: 200.0,
            height: 100.0,
        };
        let fit = cover_fit(100, 100, dest);
        assert_eq!(fit.scale, 2.0);
        assert_eq!(fit.draw.x, 50.0);
        assert_eq!(fit.draw.y, -30.0);
        assert_eq!(fit.draw.height, 200.0);
    }

    #[test]
    fn test_radius_clamped() {
        let layout = StripLayout::canonical();
        let small = Rect {
            x: 0.0,
            y: 0.0,
            width: 20.0,
            height: 40.0,
        };
        assert_eq!(layout.radius_for(&small), 10.0);
    }
}
