// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic camera source
//!
//! Generates frames in memory so the booth can run without a webcam
//! (`--synthetic`) and so capture flows can be tested deterministically.

use super::CameraSource;
use super::types::CameraFrame;

/// Classic SMPTE-ish colour bars
const BARS: [[u8; 3]; 7] = [
    [192, 192, 192],
    [192, 192, 0],
    [0, 192, 192],
    [0, 192, 0],
    [192, 0, 192],
    [192, 0, 0],
    [0, 0, 192],
];

enum Pattern {
    /// Colour bars scrolling by one bar width every frame
    Bars,
    /// Solid colours, one per frame, cycling
    Solid(Vec<[u8; 3]>),
}

/// In-memory camera producing one new frame per poll
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    pattern: Pattern,
    frames_produced: u64,
}

impl SyntheticCamera {
    /// Scrolling colour bars
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pattern: Pattern::Bars,
            frames_produced: 0,
        }
    }

    /// Solid-colour frames cycling through `colors`
    pub fn solid_sequence(width: u32, height: u32, colors: Vec<[u8; 3]>) -> Self {
        let colors = if colors.is_empty() {
            vec![[0, 0, 0]]
        } else {
            colors
        };
        Self {
            width,
            height,
            pattern: Pattern::Solid(colors),
            frames_produced: 0,
        }
    }

    /// Number of frames handed out so far
    pub fn frames_produced(&self) -> u64 {
        self.frames_produced
    }

    fn render(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        match &self.pattern {
            Pattern::Solid(colors) => {
                let [r, g, b] = colors[(self.frames_produced as usize) % colors.len()];
                for _ in 0..(self.width * self.height) {
                    data.extend_from_slice(&[r, g, b, 255]);
                }
            }
            Pattern::Bars => {
                let bar_width = (self.width / BARS.len() as u32).max(1);
                let shift = self.frames_produced as usize;
                for _y in 0..self.height {
                    for x in 0..self.width {
                        let bar = ((x / bar_width) as usize + shift) % BARS.len();
                        let [r, g, b] = BARS[bar];
                        data.extend_from_slice(&[r, g, b, 255]);
                    }
                }
            }
        }
        data
    }
}

impl CameraSource for SyntheticCamera {
    fn device_name(&self) -> &str {
        "Synthetic test pattern"
    }

    fn poll_frame(&mut self) -> Option<CameraFrame> {
        let frame = CameraFrame::from_rgba(self.width, self.height, self.render());
        self.frames_produced += 1;
        Some(frame)
    }
}
