// SPDX-License-Identifier: GPL-3.0-only

//! Anti-aliased rounded-rectangle clipping and stroking on RGBA canvases
//!
//! Coverage comes from the signed distance of each pixel centre to the
//! rounded rectangle outline, which gives a one-pixel soft edge much like a
//! 2D canvas rasteriser.

use super::layout::Rect;
use image::{Rgba, RgbaImage};

/// Signed distance from (px, py) to a rounded rectangle outline
/// (negative inside)
pub fn rounded_rect_distance(px: f32, py: f32, rect: &Rect, radius: f32) -> f32 {
    let (cx, cy) = rect.center();
    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;

    let qx = (px - cx).abs() - (half_w - radius);
    let qy = (py - cy).abs() - (half_h - radius);

    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);
    outside + inside - radius
}

/// Fraction of a pixel covered by the filled shape
#[inline]
pub fn fill_coverage(distance: f32) -> f32 {
    (0.5 - distance).clamp(0.0, 1.0)
}

/// Fraction of a pixel covered by a stroke of `width` centred on the outline
#[inline]
pub fn stroke_coverage(distance: f32, width: f32) -> f32 {
    (width / 2.0 + 0.5 - distance.abs()).clamp(0.0, 1.0)
}

/// Source-over blend of `src` into `dst` with extra `coverage`
#[inline]
pub fn blend(dst: &mut Rgba<u8>, src: [u8; 4], coverage: f32) {
    let alpha = (src[3] as f32 / 255.0) * coverage;
    if alpha <= 0.0 {
        return;
    }
    if alpha >= 1.0 {
        dst.0 = src;
        return;
    }

    let dst_alpha = dst.0[3] as f32 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    for c in 0..3 {
        let s = src[c] as f32 * alpha;
        let d = dst.0[c] as f32 * dst_alpha * (1.0 - alpha);
        dst.0[c] = ((s + d) / out_alpha).round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_alpha * 255.0).round() as u8;
}

/// Integer pixel bounds of `rect` grown by `margin`, clipped to the canvas
fn pixel_bounds(canvas: &RgbaImage, rect: &Rect, margin: f32) -> (u32, u32, u32, u32) {
    let x0 = (rect.x - margin).floor().max(0.0) as u32;
    let y0 = (rect.y - margin).floor().max(0.0) as u32;
    let x1 = ((rect.x + rect.width + margin).ceil().max(0.0) as u32).min(canvas.width());
    let y1 = ((rect.y + rect.height + margin).ceil().max(0.0) as u32).min(canvas.height());
    (x0, y0, x1, y1)
}

/// Draw `source`, already scaled to `placement` size, positioned at
/// `placement` and clipped to the rounded rectangle `clip`
pub fn draw_clipped(
    canvas: &mut RgbaImage,
    source: &RgbaImage,
    placement: &Rect,
    clip: &Rect,
    radius: f32,
) {
    if clip.is_empty() || source.width() == 0 || source.height() == 0 {
        return;
    }
    let (x0, y0, x1, y1) = pixel_bounds(canvas, clip, 0.0);
    let max_u = source.width() as i64 - 1;
    let max_v = source.height() as i64 - 1;

    for py in y0..y1 {
        let cy = py as f32 + 0.5;
        for px in x0..x1 {
            let cx = px as f32 + 0.5;
            let coverage = fill_coverage(rounded_rect_distance(cx, cy, clip, radius));
            if coverage <= 0.0 {
                continue;
            }
            let u = ((cx - placement.x).floor() as i64).clamp(0, max_u) as u32;
            let v = ((cy - placement.y).floor() as i64).clamp(0, max_v) as u32;
            let src = source.get_pixel(u, v).0;
            blend(canvas.get_pixel_mut(px, py), src, coverage);
        }
    }
}

/// Stroke the outline of a rounded rectangle
pub fn stroke_rounded_rect(
    canvas: &mut RgbaImage,
    rect: &Rect,
    radius: f32,
    color: [u8; 4],
    width: f32,
) {
    if rect.is_empty() || width <= 0.0 {
        return;
    }
    let (x0, y0, x1, y1) = pixel_bounds(canvas, rect, width + 1.0);

    for py in y0..y1 {
        let cy = py as f32 + 0.5;
        for px in x0..x1 {
            let cx = px as f32 + 0.5;
            let coverage = stroke_coverage(rounded_rect_distance(cx, cy, rect, radius), width);
            if coverage > 0.0 {
                blend(canvas.get_pixel_mut(px, py), color, coverage);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
        }
    }

    #[test]
    fn test_distance_signs() {
        let r = rect();
        assert!(rounded_rect_distance(60.0, 35.0, &r, 10.0) < 0.0);
        assert!(rounded_rect_distance(5.0, 35.0, &r, 10.0) > 0.0);
        // On the straight top edge
        assert!(rounded_rect_distance(60.0, 10.0, &r, 10.0).abs() < 1e-4);
        // Corner point is cut away by the radius
        assert!(rounded_rect_distance(10.5, 10.5, &r, 10.0) > 0.0);
    }

    #[test]
    fn test_blend_extremes() {
        let mut px = Rgba([0, 0, 0, 255]);
        blend(&mut px, [200, 100, 50, 255], 1.0);
        assert_eq!(px.0, [200, 100, 50, 255]);

        let mut px = Rgba([0, 0, 0, 255]);
        blend(&mut px, [200, 100, 50, 255], 0.0);
        assert_eq!(px.0, [0, 0, 0, 255]);

        let mut px = Rgba([0, 0, 0, 255]);
        blend(&mut px, [200, 200, 200, 255], 0.5);
        assert_eq!(px.0, [100, 100, 100, 255]);
    }

    #[test]
    fn test_stroke_hits_edge_not_centre() {
        let mut canvas = RgbaImage::from_pixel(120, 70, Rgba([255, 255, 255, 255]));
        stroke_rounded_rect(&mut canvas, &rect(), 10.0, [0, 0, 0, 255], 2.0);

        assert_eq!(canvas.get_pixel(60, 10).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(60, 35).0, [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(10, 10).0, [255, 255, 255, 255]);
    }
}
