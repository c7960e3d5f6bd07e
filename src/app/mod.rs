// SPDX-License-Identifier: MPL-2.0

//! Booth controller
//!
//! [`Booth`] owns the camera, the capture session and every background task
//! the session spawns. It is driven from a single event loop: user actions
//! call methods directly, timers and delivery tasks report back through the
//! [`BoothEvent`] channel returned by [`Booth::new`].
//!
//! # Architecture
//!
//! - `state`: Session data and the booth state machine
//! - `timer`: Abortable countdown and pause tasks
//!
//! # Capture flow
//!
//! ```text
//! start_sequence ─▶ countdown(3..1) ─▶ capture slot i ─▶ pause ─┐
//!        ▲                                                      │
//!        └──────────────────── i + 1 < 3 ◀──────────────────────┘
//!                                  │ otherwise
//!                                  ▼
//!                         review / retaking(first gap)
//! ```

pub mod state;
pub mod timer;

pub use state::{BoothMode, CaptureSession, SendStatus};

use crate::backends::camera::{CameraFrame, CameraSource};
use crate::constants::{SHOT_COUNT, timing};
use crate::delivery::StripSender;
use crate::errors::{DeliveryError, SessionError};
use crate::pipelines::photo::{FilterType, PhotoPipeline, Shot};
use crate::pipelines::strip::StripCompositor;
use crate::storage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use timer::TimerHandle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

/// Events reported back to the booth by its background tasks
#[derive(Debug)]
pub enum BoothEvent {
    /// Countdown advanced to `remaining`
    CountdownTick { generation: u64, remaining: u32 },
    /// Countdown reached zero, time to capture
    CountdownElapsed { generation: u64 },
    /// Pause between two sequence shots is over
    PauseElapsed { generation: u64 },
    /// Email delivery finished for the session with this id
    SendFinished {
        session: u64,
        result: Result<(), DeliveryError>,
    },
    /// Strip download finished
    DownloadFinished(Result<PathBuf, DeliveryError>),
}

/// Tunables of a booth
#[derive(Debug, Clone)]
pub struct BoothSettings {
    pub countdown_seconds: u32,
    pub countdown_tick: Duration,
    pub shot_pause: Duration,
    pub initial_filter: FilterType,
    pub output_dir: PathBuf,
}

impl Default for BoothSettings {
    fn default() -> Self {
        Self {
            countdown_seconds: timing::COUNTDOWN_SECONDS,
            countdown_tick: timing::COUNTDOWN_TICK,
            shot_pause: timing::SHOT_PAUSE,
            initial_filter: FilterType::default(),
            output_dir: storage::default_output_dir(),
        }
    }
}

/// Photobooth controller
pub struct Booth {
    camera: Option<Box<dyn CameraSource>>,
    latest_frame: Option<CameraFrame>,
    photo: PhotoPipeline,
    compositor: Arc<StripCompositor>,
    sender: Arc<dyn StripSender>,
    settings: BoothSettings,
    filter: FilterType,
    session: CaptureSession,
    events: UnboundedSender<BoothEvent>,
    /// Bumped whenever pending timers are cancelled
    generation: u64,
    /// Bumped whenever the session is reset
    session_id: u64,
    timer: Option<TimerHandle>,
    downloading: bool,
    alert: Option<String>,
    notice: Option<String>,
    last_saved: Option<PathBuf>,
}

impl Booth {
    /// Create a booth and the receiver its background events arrive on
    ///
    /// `camera` is `None` when acquisition failed; the booth then refuses to
    /// capture but everything else keeps working.
    pub fn new(
        camera: Option<Box<dyn CameraSource>>,
        compositor: Arc<StripCompositor>,
        sender: Arc<dyn StripSender>,
        settings: BoothSettings,
    ) -> (Self, UnboundedReceiver<BoothEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        if camera.is_none() {
            warn!("Booth started without a camera, capture disabled");
        }
        let booth = Self {
            camera,
            latest_frame: None,
            photo: PhotoPipeline::new(),
            compositor,
            sender,
            filter: settings.initial_filter,
            settings,
            session: CaptureSession::new(),
            events,
            generation: 0,
            session_id: 0,
            timer: None,
            downloading: false,
            alert: None,
            notice: None,
            last_saved: None,
        };
        (booth, receiver)
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn mode(&self) -> BoothMode {
        self.session.mode
    }

    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    pub fn camera_name(&self) -> Option<&str> {
        self.camera.as_ref().map(|c| c.device_name())
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    /// Change the active filter; only shots taken afterwards are affected
    pub fn set_filter(&mut self, filter: FilterType) {
        if self.filter != filter {
            info!(filter = %filter, "Filter selected");
            self.filter = filter;
        }
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.filter.next());
    }

    /// A countdown or pause is pending
    pub fn is_busy(&self) -> bool {
        self.timer.is_some()
    }

    pub fn is_downloading(&self) -> bool {
        self.downloading
    }

    /// Blocking error message waiting to be acknowledged
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Latest informational message
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Path of the most recently downloaded strip
    pub fn last_saved(&self) -> Option<&PathBuf> {
        self.last_saved.as_ref()
    }

    /// Pull the newest frame from the camera, keeping the previous one if
    /// nothing new arrived
    pub fn poll_camera(&mut self) -> Option<&CameraFrame> {
        if let Some(frame) = self.camera.as_mut().and_then(|c| c.poll_frame()) {
            self.latest_frame = Some(frame);
        }
        self.latest_frame.as_ref()
    }

    pub fn latest_frame(&self) -> Option<&CameraFrame> {
        self.latest_frame.as_ref()
    }

    /// Clear the session and capture all three slots in order
    pub fn start_sequence(&mut self) -> Result<(), SessionError> {
        if self.camera.is_none() {
            return Err(SessionError::CameraUnavailable);
        }
        if self.timer.is_some() {
            return Err(SessionError::CaptureInProgress);
        }

        self.reset_session();
        self.session.mode = BoothMode::Capturing(0);
        info!("Capture sequence started");
        self.begin_countdown();
        Ok(())
    }

    /// Clear slot `slot` and wait for the user to take its replacement
    pub fn retake(&mut self, slot: usize) -> Result<(), SessionError> {
        if !self.session.mode.is_review() {
            return Err(SessionError::NotInReview);
        }
        if slot >= SHOT_COUNT {
            return Err(SessionError::InvalidSlot(slot));
        }
        if self.session.is_sending() {
            return Err(SessionError::SendInFlight);
        }

        self.cancel_timers();
        self.session.clear_slot(slot);
        self.session.countdown = None;
        self.session.mode = BoothMode::Retaking(slot);
        info!(slot, "Retaking shot");
        Ok(())
    }

    /// Run the countdown for the slot being retaken
    pub fn take_retake_shot(&mut self) -> Result<(), SessionError> {
        let BoothMode::Retaking(slot) = self.session.mode else {
            return Err(SessionError::NotRetaking);
        };
        if self.camera.is_none() {
            return Err(SessionError::CameraUnavailable);
        }
        if self.timer.is_some() {
            return Err(SessionError::CaptureInProgress);
        }

        debug!(slot, "Retake countdown started");
        self.begin_countdown();
        Ok(())
    }

    /// Drop everything and go back to idle
    pub fn start_over(&mut self) {
        self.reset_session();
        info!("Session reset");
    }

    /// Replace the email field (only while reviewing)
    pub fn set_email(&mut self, email: impl Into<String>) -> Result<(), SessionError> {
        if !self.session.mode.is_review() {
            return Err(SessionError::NotInReview);
        }
        self.session.email = email.into();
        Ok(())
    }

    /// Compose the strip and hand it to the relay
    pub fn send_email(&mut self) -> Result<(), SessionError> {
        if !self.session.mode.is_review() {
            return Err(SessionError::NotInReview);
        }
        match self.session.send_status {
            SendStatus::Sending => return Err(SessionError::SendInFlight),
            SendStatus::Sent => return Err(SessionError::AlreadySent),
            SendStatus::Idle => {}
        }
        let email = self.session.email.trim().to_string();
        if email.is_empty() {
            return Err(SessionError::EmptyEmail);
        }

        self.session.send_status = SendStatus::Sending;
        self.notice = Some("Sending...".to_string());
        info!(%email, "Sending strip");

        let compositor = Arc::clone(&self.compositor);
        let shots = self.session.shots.to_vec();
        let sender = Arc::clone(&self.sender);
        let events = self.events.clone();
        let session = self.session_id;

        tokio::spawn(async move {
            let result = async {
                let png = compose_in_background(compositor, shots).await?;
                sender.send(email, png).await
            }
            .await;
            let _ = events.send(BoothEvent::SendFinished { session, result });
        });
        Ok(())
    }

    /// Compose the strip and write it to the output directory
    pub fn download(&mut self) -> Result<(), SessionError> {
        if !self.session.mode.is_review() {
            return Err(SessionError::NotInReview);
        }
        if self.downloading {
            return Err(SessionError::DownloadInFlight);
        }

        self.downloading = true;
        let compositor = Arc::clone(&self.compositor);
        let shots = self.session.shots.to_vec();
        let dir = self.settings.output_dir.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let result: Result<PathBuf, DeliveryError> = async {
                let png = compose_in_background(compositor, shots).await?;
                Ok(storage::save_strip(&dir, &png).await?)
            }
            .await;
            let _ = events.send(BoothEvent::DownloadFinished(result));
        });
        Ok(())
    }

    /// Apply one background event
    pub fn handle_event(&mut self, event: BoothEvent) {
        match event {
            BoothEvent::CountdownTick {
                generation,
                remaining,
            } => {
                if self.is_current(generation) {
                    self.session.countdown = Some(remaining);
                }
            }
            BoothEvent::CountdownElapsed { generation } => {
                if self.is_current(generation) {
                    self.handle_countdown_elapsed();
                } else {
                    debug!(generation, "Ignoring stale countdown");
                }
            }
            BoothEvent::PauseElapsed { generation } => {
                if self.is_current(generation) {
                    self.handle_pause_elapsed();
                } else {
                    debug!(generation, "Ignoring stale pause");
                }
            }
            BoothEvent::SendFinished { session, result } => {
                if session != self.session_id {
                    debug!(session, "Ignoring send result of a previous session");
                    return;
                }
                match result {
                    Ok(()) => {
                        info!("Email sent");
                        self.session.send_status = SendStatus::Sent;
                        self.notice = Some("Email sent!".to_string());
                    }
                    Err(e) => {
                        error!(error = %e, "Email delivery failed");
                        self.session.send_status = SendStatus::Idle;
                        self.notice = None;
                        self.alert = Some(format!("Failed to send email: {}", e));
                    }
                }
            }
            BoothEvent::DownloadFinished(result) => {
                self.downloading = false;
                match result {
                    Ok(path) => {
                        self.notice = Some(format!("Saved to {}", path.display()));
                        self.last_saved = Some(path);
                    }
                    Err(e) => {
                        error!(error = %e, "Strip download failed");
                        self.alert = Some(format!("Failed to save strip: {}", e));
                    }
                }
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|t| t.generation() == generation)
    }

    fn handle_countdown_elapsed(&mut self) {
        self.timer = None;
        self.session.countdown = None;

        match self.session.mode {
            BoothMode::Capturing(slot) => {
                self.capture_into(slot);
                self.begin_pause();
            }
            BoothMode::Retaking(slot) => {
                self.capture_into(slot);
                self.session.settle();
                info!(mode = ?self.session.mode, "Retake finished");
            }
            BoothMode::Idle | BoothMode::Review => {
                warn!(mode = ?self.session.mode, "Countdown elapsed outside a capture");
            }
        }
    }

    fn handle_pause_elapsed(&mut self) {
        self.timer = None;

        let BoothMode::Capturing(slot) = self.session.mode else {
            return;
        };
        if slot + 1 < SHOT_COUNT {
            self.session.mode = BoothMode::Capturing(slot + 1);
            self.begin_countdown();
        } else {
            self.session.settle();
            info!(
                mode = ?self.session.mode,
                filled = self.session.filled_count(),
                "Capture sequence finished"
            );
        }
    }

    /// Snapshot the newest frame into `slot`; a missing frame leaves it empty
    fn capture_into(&mut self, slot: usize) {
        self.poll_camera();
        let Some(frame) = self.latest_frame.as_ref() else {
            warn!(slot, "No frame available, slot left empty");
            return;
        };

        match self.photo.capture(frame, self.filter) {
            Ok(shot) => {
                debug!(slot, shot_id = %shot.id, "Shot stored");
                self.session.store(slot, shot);
            }
            Err(e) => {
                warn!(slot, error = %e, "Capture failed, slot left empty");
            }
        }
    }

    fn begin_countdown(&mut self) {
        self.generation += 1;
        self.session.countdown = Some(self.settings.countdown_seconds);
        self.timer = Some(timer::spawn_countdown(
            self.events.clone(),
            self.generation,
            self.settings.countdown_seconds,
            self.settings.countdown_tick,
        ));
    }

    fn begin_pause(&mut self) {
        self.generation += 1;
        self.timer = Some(timer::spawn_pause(
            self.events.clone(),
            self.generation,
            self.settings.shot_pause,
        ));
    }

    fn cancel_timers(&mut self) {
        if self.timer.take().is_some() {
            debug!("Pending timer cancelled");
        }
        self.generation += 1;
    }

    fn reset_session(&mut self) {
        self.cancel_timers();
        self.session.reset();
        self.session_id += 1;
        self.alert = None;
        self.notice = None;
    }
}

/// Compose on the blocking pool so the event loop keeps running
async fn compose_in_background(
    compositor: Arc<StripCompositor>,
    shots: Vec<Option<Shot>>,
) -> Result<Vec<u8>, DeliveryError> {
    let png = tokio::task::spawn_blocking(move || compositor.compose_png(&shots))
        .await
        .map_err(|e| DeliveryError::Task(e.to_string()))??;
    Ok(png)
}
