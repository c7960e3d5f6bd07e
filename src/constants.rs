// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Number of shots in one strip
pub const SHOT_COUNT: usize = 3;

/// Default folder name for saved strips (under the pictures directory)
pub const DEFAULT_SAVE_FOLDER: &str = "Photobooth";

/// Application directory name used for config and log files
pub const APP_DIR_NAME: &str = "photobooth";

/// Timing constants for the capture sequence
pub mod timing {
    use super::Duration;

    /// Countdown length before each shot, in ticks
    pub const COUNTDOWN_SECONDS: u32 = 3;

    /// Interval between countdown ticks
    pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

    /// Pause after a shot before the next countdown starts
    pub const SHOT_PAUSE: Duration = Duration::from_millis(400);

    /// Terminal input poll interval (also bounds preview refresh rate)
    pub const UI_POLL: Duration = Duration::from_millis(16);

    /// Timeout waiting for the camera pipeline to reach PLAYING
    pub const START_TIMEOUT_SECS: u64 = 5;

    /// Timeout waiting for the camera pipeline to reach NULL
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Log frame statistics every N frames
    pub const FRAME_LOG_INTERVAL: u64 = 300;
}

/// Camera capture settings
pub mod camera {
    /// Preferred preview width; other sizes are accepted when the device lacks it
    pub const PREFERRED_WIDTH: i32 = 1280;
    /// Preferred preview height
    pub const PREFERRED_HEIGHT: i32 = 720;
}

/// Canonical polaroid strip layout
///
/// The coordinates match the embedded template artwork (`assets/polaroid.png`).
pub mod strip {
    /// Output canvas width
    pub const CANVAS_WIDTH: u32 = 1666;
    /// Output canvas height
    pub const CANVAS_HEIGHT: u32 = 3000;

    /// Slot regions on the template as (x, y, width, height)
    pub const SLOTS: [(u32, u32, u32, u32); super::SHOT_COUNT] = [
        (130, 134, 1395, 801),
        (130, 951, 1395, 801),
        (130, 1769, 1395, 801),
    ];

    /// Inset between a slot region and the photo drawn into it
    pub const PADDING: u32 = 40;

    /// Corner radius of the photo clip
    pub const CORNER_RADIUS: f32 = 30.0;

    /// Border stroke colour (#1B3444)
    pub const STROKE_COLOR: [u8; 4] = [0x1B, 0x34, 0x44, 0xFF];

    /// Border stroke width
    pub const STROKE_WIDTH: f32 = 2.0;

    /// Template asset name inside the embedded asset folder
    pub const TEMPLATE_ASSET: &str = "polaroid.png";
}

/// Mail relay defaults
pub mod relay {
    /// Route the booth posts strips to
    pub const SEND_EMAIL_PATH: &str = "/api/sendEmail";

    /// Default listen address of the relay
    pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

    /// Default relay URL used by the booth
    pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";

    /// Default SMTP submission port
    pub const DEFAULT_SMTP_PORT: u16 = 587;

    /// Subject of outgoing mails
    pub const DEFAULT_SUBJECT: &str = "Photobooth";

    /// Plain-text body of outgoing mails
    pub const DEFAULT_BODY: &str = "Here is your photostrip!";

    /// Base name of the attachment (extension follows the image type)
    pub const ATTACHMENT_STEM: &str = "photostrip";

    /// Largest request body the relay accepts (strips are a few MB as base64)
    pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

    /// Client-side timeout for one relay request
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;
}
