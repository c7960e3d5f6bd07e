// SPDX-License-Identifier: MPL-2.0

//! Integration tests for strip compositing

use image::{Rgba, RgbaImage};
use photobooth::assets;
use photobooth::constants::strip;
use photobooth::errors::CompositionError;
use photobooth::pipelines::photo::{Shot, decode_rgba, encode_png};
use photobooth::pipelines::strip::{SlotRect, StripCompositor, StripLayout};

fn solid_shot(width: u32, height: u32, rgb: [u8; 3]) -> Shot {
    let image = RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]));
    Shot::from_encoded(encode_png(&image).unwrap()).unwrap()
}

fn canonical_template() -> RgbaImage {
    let data = assets::get(strip::TEMPLATE_ASSET).unwrap();
    decode_rgba(&data).unwrap()
}

#[test]
fn test_canonical_strip_is_canvas_sized_for_any_slot_subset() {
    let compositor = StripCompositor::canonical().unwrap();
    let shot = solid_shot(64, 36, [10, 20, 30]);

    let subsets: [[bool; 3]; 4] = [
        [false, false, false],
        [true, false, false],
        [false, true, true],
        [true, true, true],
    ];
    for subset in subsets {
        let shots: Vec<Option<Shot>> = subset
            .iter()
            .map(|&filled| filled.then(|| shot.clone()))
            .collect();
        let png = compositor.compose_png(&shots).unwrap();
        let strip = decode_rgba(&png).unwrap();
        assert_eq!(
            strip.dimensions(),
            (strip::CANVAS_WIDTH, strip::CANVAS_HEIGHT),
            "subset {:?}",
            subset
        );
    }
}

#[test]
fn test_canonical_slot_geometry() {
    let template = canonical_template();
    let compositor = StripCompositor::canonical().unwrap();
    let color = [220, 40, 90];

    let out = compositor
        .compose(&[Some(solid_shot(160, 90, color)), None, None])
        .unwrap();

    // Photo rect of slot 0 is (170, 174, 1315, 721)
    let center = out.get_pixel(170 + 657, 174 + 360).0;
    assert_eq!(center, [color[0], color[1], color[2], 255]);

    // Rounded corner keeps the template
    assert_eq!(out.get_pixel(170, 174), template.get_pixel(170, 174));

    // Border stroke on the top edge
    assert_eq!(out.get_pixel(170 + 657, 174).0, strip::STROKE_COLOR);

    // Padding between slot and photo keeps the template
    assert_eq!(out.get_pixel(150, 500), template.get_pixel(150, 500));

    // Empty slot 1 is untouched
    let slot1_center = (170 + 657, 951 + 40 + 360);
    assert_eq!(
        out.get_pixel(slot1_center.0, slot1_center.1),
        template.get_pixel(slot1_center.0, slot1_center.1)
    );
}

#[test]
fn test_cover_fit_center_crops() {
    // One wide slot, photo rect 40x10 at (0, 0)
    let layout = StripLayout {
        canvas_width: 40,
        canvas_height: 10,
        slots: vec![SlotRect::new(0, 0, 40, 10)],
        padding: 0,
        corner_radius: 0.0,
        stroke_color: [0, 0, 0, 0],
        stroke_width: 0.0,
    };
    let compositor = StripCompositor::new(RgbaImage::new(40, 10), layout);

    // Square source: top half red, bottom half blue. Scaled to 40x40 and
    // centred, only rows 15..25 of the scaled image are visible.
    let mut source = RgbaImage::new(20, 20);
    for (_, y, px) in source.enumerate_pixels_mut() {
        *px = if y < 10 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        };
    }
    let shot = Shot::from_encoded(encode_png(&source).unwrap()).unwrap();
    let out = compositor.compose(&[Some(shot)]).unwrap();

    assert_eq!(out.get_pixel(20, 0).0, [255, 0, 0, 255]);
    assert_eq!(out.get_pixel(20, 9).0, [0, 0, 255, 255]);
    assert_eq!(out.get_pixel(0, 0).0, [255, 0, 0, 255]);
}

#[test]
fn test_extreme_aspect_sources_fill_the_slot() {
    let compositor = StripCompositor::canonical().unwrap();
    let tall = solid_shot(1, 4000, [12, 200, 40]);
    let wide = solid_shot(4000, 1, [240, 120, 8]);

    let out = compositor.compose(&[Some(tall), Some(wide), None]).unwrap();

    assert_eq!(out.dimensions(), (strip::CANVAS_WIDTH, strip::CANVAS_HEIGHT));
    assert_eq!(out.get_pixel(170 + 657, 174 + 360).0, [12, 200, 40, 255]);
    assert_eq!(out.get_pixel(180, 174 + 360).0, [12, 200, 40, 255]);
    assert_eq!(out.get_pixel(170 + 657, 991 + 360).0, [240, 120, 8, 255]);
    assert_eq!(out.get_pixel(170 + 657, 991 + 5).0, [240, 120, 8, 255]);
}

#[test]
fn test_undecodable_shot_is_composition_error() {
    let layout = StripLayout {
        canvas_width: 10,
        canvas_height: 10,
        slots: vec![SlotRect::new(0, 0, 10, 10)],
        padding: 1,
        corner_radius: 2.0,
        stroke_color: [0, 0, 0, 255],
        stroke_width: 1.0,
    };
    let compositor = StripCompositor::new(RgbaImage::new(10, 10), layout);
    let mut shot = solid_shot(4, 4, [1, 2, 3]);
    shot.data = std::sync::Arc::from(b"garbage".to_vec());

    let err = compositor.compose(&[Some(shot)]).unwrap_err();
    assert!(matches!(err, CompositionError::ShotDecode { slot: 0, .. }));
}

#[test]
fn test_custom_template_from_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("template.png");
    let template = RgbaImage::from_pixel(833, 1500, Rgba([1, 2, 3, 255]));
    std::fs::write(&path, encode_png(&template).unwrap()).unwrap();

    let compositor = StripCompositor::from_path(&path).unwrap();
    let out = compositor.compose(&[]).unwrap();
    assert_eq!(out.dimensions(), (strip::CANVAS_WIDTH, strip::CANVAS_HEIGHT));
    assert_eq!(out.get_pixel(5, 5).0, [1, 2, 3, 255]);
}

#[test]
fn test_missing_template_path() {
    let err = StripCompositor::from_path(std::path::Path::new("/nonexistent/template.png"))
        .unwrap_err();
    assert!(matches!(err, CompositionError::Template(_)));
}
