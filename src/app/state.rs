// SPDX-License-Identifier: GPL-3.0-only

//! Capture session state

use crate::constants::SHOT_COUNT;
use crate::pipelines::photo::Shot;

/// Booth state machine
///
/// ```text
/// Idle ──start──▶ Capturing(0..2) ──all filled──▶ Review
///                                                  │  ▲
///                                        retake(i) ▼  │ all filled
///                                              Retaking(i)
/// ```
///
/// Any state returns to `Idle` on start over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoothMode {
    /// Waiting for a sequence to start
    #[default]
    Idle,
    /// Sequence running, currently on this slot
    Capturing(usize),
    /// All shots taken, strip ready for delivery
    Review,
    /// This slot was cleared and awaits a new shot
    Retaking(usize),
}

impl BoothMode {
    /// Slot the next shot will be stored in, if any
    pub fn target_slot(&self) -> Option<usize> {
        match self {
            Self::Capturing(slot) | Self::Retaking(slot) => Some(*slot),
            Self::Idle | Self::Review => None,
        }
    }

    pub fn is_review(&self) -> bool {
        matches!(self, Self::Review)
    }
}

/// Email delivery state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SendStatus {
    #[default]
    Idle,
    /// Request in flight
    Sending,
    /// Relay accepted the strip
    Sent,
}

/// Everything one visitor produces at the booth
#[derive(Debug, Clone, Default)]
pub struct CaptureSession {
    pub shots: [Option<Shot>; SHOT_COUNT],
    pub mode: BoothMode,
    /// Visible countdown value while a countdown runs
    pub countdown: Option<u32>,
    pub email: String,
    pub send_status: SendStatus,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear shots, email and send status, back to idle
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn all_filled(&self) -> bool {
        self.shots.iter().all(Option::is_some)
    }

    pub fn filled_count(&self) -> usize {
        self.shots.iter().filter(|s| s.is_some()).count()
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.shots.iter().position(Option::is_none)
    }

    /// Store `shot` at `slot`, replacing whatever was there
    pub fn store(&mut self, slot: usize, shot: Shot) {
        if let Some(entry) = self.shots.get_mut(slot) {
            *entry = Some(shot);
        }
    }

    pub fn clear_slot(&mut self, slot: usize) {
        if let Some(entry) = self.shots.get_mut(slot) {
            *entry = None;
        }
    }

    /// Review when every slot has a shot, otherwise retake the first gap
    pub fn settle(&mut self) {
        self.countdown = None;
        self.mode = match self.first_empty() {
            None => BoothMode::Review,
            Some(slot) => BoothMode::Retaking(slot),
        };
    }

    pub fn is_sending(&self) -> bool {
        self.send_status == SendStatus::Sending
    }
}
