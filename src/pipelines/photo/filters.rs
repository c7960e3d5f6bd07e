// SPDX-License-Identifier: MPL-2.0

//! Photo filters
//!
//! Each filter is defined by the CSS filter expression it stands for and is
//! rendered with the W3C Filter Effects colour matrices for those functions,
//! in sRGB space. The same code path filters the live preview and the
//! captured shot, so what the user sees is what gets stored.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Filter selectable in the booth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// No filter applied
    #[default]
    Normal,
    /// Full desaturation
    Grayscale,
    /// Warm brownish tone
    Sepia,
    /// Raised contrast with slightly muted colours
    Vintage,
}

impl FilterType {
    /// All filters in display order
    pub const ALL: [FilterType; 4] = [
        FilterType::Normal,
        FilterType::Grayscale,
        FilterType::Sepia,
        FilterType::Vintage,
    ];

    /// Get display name for the filter
    pub fn display_name(&self) -> &'static str {
        match self {
            FilterType::Normal => "Normal",
            FilterType::Grayscale => "Grayscale",
            FilterType::Sepia => "Sepia",
            FilterType::Vintage => "Vintage",
        }
    }

    /// CSS filter expression this filter renders
    pub fn css_expression(&self) -> &'static str {
        match self {
            FilterType::Normal => "",
            FilterType::Grayscale => "grayscale(100%)",
            FilterType::Sepia => "sepia(100%)",
            FilterType::Vintage => "contrast(1.2) saturate(0.8)",
        }
    }

    /// Next filter in display order, wrapping around
    pub fn next(&self) -> Self {
        let index = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterType::ALL
            .iter()
            .copied()
            .find(|f| f.display_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<&str> = FilterType::ALL.iter().map(|f| f.display_name()).collect();
                format!("unknown filter '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

type ColorMatrix = [[f32; 3]; 3];

/// grayscale(100%)
const GRAYSCALE: ColorMatrix = [
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
    [0.2126, 0.7152, 0.0722],
];

/// sepia(100%)
const SEPIA: ColorMatrix = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

const VINTAGE_CONTRAST: f32 = 1.2;
const VINTAGE_SATURATION: f32 = 0.8;

/// saturate(s) matrix
fn saturate_matrix(s: f32) -> ColorMatrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

#[inline]
fn apply_matrix(r: &mut f32, g: &mut f32, b: &mut f32, m: &ColorMatrix) {
    let (ir, ig, ib) = (*r, *g, *b);
    *r = (m[0][0] * ir + m[0][1] * ig + m[0][2] * ib).clamp(0.0, 1.0);
    *g = (m[1][0] * ir + m[1][1] * ig + m[1][2] * ib).clamp(0.0, 1.0);
    *b = (m[2][0] * ir + m[2][1] * ig + m[2][2] * ib).clamp(0.0, 1.0);
}

/// contrast(c): linear transfer with slope c around mid grey
#[inline]
fn apply_contrast(value: &mut f32, amount: f32) {
    *value = (*value * amount + (0.5 - 0.5 * amount)).clamp(0.0, 1.0);
}

/// Apply filter effect to normalised RGB values in-place
#[inline]
pub fn apply_filter_rgb(r: &mut f32, g: &mut f32, b: &mut f32, filter: FilterType) {
    match filter {
        FilterType::Normal => {}
        FilterType::Grayscale => apply_matrix(r, g, b, &GRAYSCALE),
        FilterType::Sepia => apply_matrix(r, g, b, &SEPIA),
        FilterType::Vintage => {
            // Functions apply left to right: contrast first, then saturate
            apply_contrast(r, VINTAGE_CONTRAST);
            apply_contrast(g, VINTAGE_CONTRAST);
            apply_contrast(b, VINTAGE_CONTRAST);
            apply_matrix(r, g, b, &saturate_matrix(VINTAGE_SATURATION));
        }
    }
}

/// Filter a single 8-bit RGB pixel
#[inline]
pub fn filter_pixel(filter: FilterType, rgb: (u8, u8, u8)) -> (u8, u8, u8) {
    if filter == FilterType::Normal {
        return rgb;
    }
    let mut r = rgb.0 as f32 / 255.0;
    let mut g = rgb.1 as f32 / 255.0;
    let mut b = rgb.2 as f32 / 255.0;
    apply_filter_rgb(&mut r, &mut g, &mut b, filter);
    (to_u8(r), to_u8(g), to_u8(b))
}

/// Filter tightly packed RGBA pixels in place (alpha untouched)
pub fn apply_filter_rgba(data: &mut [u8], filter: FilterType) {
    if filter == FilterType::Normal {
        return;
    }
    for px in data.chunks_exact_mut(4) {
        let (r, g, b) = filter_pixel(filter, (px[0], px[1], px[2]));
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
