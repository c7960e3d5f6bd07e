// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the booth capture and delivery flow
//!
//! Time is paused, so countdowns and pauses complete instantly while keeping
//! their ordering.

use futures::future::BoxFuture;
use image::{Rgba, RgbaImage};
use photobooth::app::{Booth, BoothEvent, BoothMode, BoothSettings, SendStatus};
use photobooth::backends::camera::{CameraFrame, CameraSource, SyntheticCamera};
use photobooth::delivery::StripSender;
use photobooth::errors::{DeliveryError, SessionError};
use photobooth::pipelines::photo::FilterType;
use photobooth::pipelines::strip::{SlotRect, StripCompositor, StripLayout};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

const RED: [u8; 3] = [200, 30, 30];
const GREEN: [u8; 3] = [30, 200, 30];
const BLUE: [u8; 3] = [30, 30, 200];

/// Sender that records calls and answers with a fixed outcome
#[derive(Default)]
struct RecordingSender {
    calls: Mutex<Vec<(String, Vec<u8>)>>,
    fail: bool,
}

impl RecordingSender {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl StripSender for RecordingSender {
    fn send(&self, email: String, png: Vec<u8>) -> BoxFuture<'static, Result<(), DeliveryError>> {
        self.calls.lock().unwrap().push((email, png));
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(DeliveryError::Rejected {
                    status: 500,
                    message: "Failed to send email".into(),
                })
            } else {
                Ok(())
            }
        })
    }
}

/// Camera that never produces a frame
struct DarkCamera;

impl CameraSource for DarkCamera {
    fn device_name(&self) -> &str {
        "Dark"
    }

    fn poll_frame(&mut self) -> Option<CameraFrame> {
        None
    }
}

fn small_compositor() -> Arc<StripCompositor> {
    let layout = StripLayout {
        canvas_width: 40,
        canvas_height: 90,
        slots: vec![
            SlotRect::new(0, 0, 40, 30),
            SlotRect::new(0, 30, 40, 30),
            SlotRect::new(0, 60, 40, 30),
        ],
        padding: 4,
        corner_radius: 3.0,
        stroke_color: [0, 0, 0, 255],
        stroke_width: 1.0,
    };
    let template = RgbaImage::from_pixel(40, 90, Rgba([255, 255, 255, 255]));
    Arc::new(StripCompositor::new(template, layout))
}

fn settings(output_dir: PathBuf) -> BoothSettings {
    BoothSettings {
        output_dir,
        ..BoothSettings::default()
    }
}

fn booth_with(
    camera: Option<Box<dyn CameraSource>>,
    sender: Arc<RecordingSender>,
) -> (Booth, UnboundedReceiver<BoothEvent>) {
    Booth::new(
        camera,
        small_compositor(),
        sender,
        settings(std::env::temp_dir().join("photobooth-tests")),
    )
}

fn rgb_camera() -> Option<Box<dyn CameraSource>> {
    Some(Box::new(SyntheticCamera::solid_sequence(
        8,
        6,
        vec![RED, GREEN, BLUE],
    )))
}

async fn run_until(
    booth: &mut Booth,
    events: &mut UnboundedReceiver<BoothEvent>,
    done: impl Fn(&Booth) -> bool,
) {
    while !done(booth) {
        let event = events.recv().await.expect("event channel closed");
        booth.handle_event(event);
    }
}

async fn complete_sequence(booth: &mut Booth, events: &mut UnboundedReceiver<BoothEvent>) {
    booth.start_sequence().unwrap();
    run_until(booth, events, |b| b.mode() == BoothMode::Review).await;
}

fn shot_color(booth: &Booth, slot: usize) -> [u8; 4] {
    let shot = booth.session().shots[slot].as_ref().unwrap();
    shot.decode().unwrap().get_pixel(0, 0).0
}

#[tokio::test(start_paused = true)]
async fn test_sequence_fills_slots_in_order_then_reviews() {
    let (mut booth, mut events) = booth_with(rgb_camera(), Arc::default());

    booth.start_sequence().unwrap();
    assert_eq!(booth.mode(), BoothMode::Capturing(0));
    assert_eq!(booth.session().countdown, Some(3));

    let mut seen = Vec::new();
    while booth.mode() != BoothMode::Review {
        let event = events.recv().await.unwrap();
        booth.handle_event(event);
        if booth.mode() == BoothMode::Capturing(0)
            && let Some(n) = booth.session().countdown
        {
            seen.push(n);
        }
    }

    assert_eq!(seen, vec![2, 1]);
    assert!(booth.session().all_filled());
    assert_eq!(booth.session().countdown, None);
    assert_eq!(shot_color(&booth, 0), [RED[0], RED[1], RED[2], 255]);
    assert_eq!(shot_color(&booth, 1), [GREEN[0], GREEN[1], GREEN[2], 255]);
    assert_eq!(shot_color(&booth, 2), [BLUE[0], BLUE[1], BLUE[2], 255]);
}

#[tokio::test(start_paused = true)]
async fn test_sequence_takes_countdown_and_pauses() {
    let (mut booth, mut events) = booth_with(rgb_camera(), Arc::default());
    let started = tokio::time::Instant::now();

    complete_sequence(&mut booth, &mut events).await;

    // 3 x (3 s countdown + 400 ms pause)
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(3 * 3400), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(3 * 3400 + 100), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn test_filter_applies_to_not_yet_taken_shots() {
    let (mut booth, mut events) = booth_with(rgb_camera(), Arc::default());
    booth.set_filter(FilterType::Grayscale);

    booth.start_sequence().unwrap();
    run_until(&mut booth, &mut events, |b| b.session().filled_count() == 1).await;
    booth.set_filter(FilterType::Normal);
    run_until(&mut booth, &mut events, |b| b.mode() == BoothMode::Review).await;

    let shots = &booth.session().shots;
    assert_eq!(shots[0].as_ref().unwrap().filter, FilterType::Grayscale);
    assert_eq!(shots[1].as_ref().unwrap().filter, FilterType::Normal);
    let [r, g, b, _] = shot_color(&booth, 0);
    assert!(r == g && g == b, "First shot should be grey");
    assert_eq!(shot_color(&booth, 1), [GREEN[0], GREEN[1], GREEN[2], 255]);
}

#[tokio::test(start_paused = true)]
async fn test_second_start_is_refused_while_running() {
    let (mut booth, _events) = booth_with(rgb_camera(), Arc::default());

    booth.start_sequence().unwrap();
    assert_eq!(booth.start_sequence(), Err(SessionError::CaptureInProgress));
    assert_eq!(booth.mode(), BoothMode::Capturing(0));
}

#[tokio::test(start_paused = true)]
async fn test_retake_changes_only_that_slot() {
    let (mut booth, mut events) = booth_with(rgb_camera(), Arc::default());
    complete_sequence(&mut booth, &mut events).await;

    let before: Vec<_> = booth
        .session()
        .shots
        .iter()
        .map(|s| s.as_ref().unwrap().id)
        .collect();

    booth.retake(1).unwrap();
    assert_eq!(booth.mode(), BoothMode::Retaking(1));
    assert!(booth.session().shots[1].is_none());

    booth.take_retake_shot().unwrap();
    assert_eq!(booth.take_retake_shot(), Err(SessionError::CaptureInProgress));
    run_until(&mut booth, &mut events, |b| b.mode() == BoothMode::Review).await;

    let after: Vec<_> = booth
        .session()
        .shots
        .iter()
        .map(|s| s.as_ref().unwrap().id)
        .collect();
    assert_eq!(after[0], before[0]);
    assert_ne!(after[1], before[1]);
    assert_eq!(after[2], before[2]);
}

#[tokio::test(start_paused = true)]
async fn test_retake_requires_review_and_valid_slot() {
    let (mut booth, mut events) = booth_with(rgb_camera(), Arc::default());
    assert_eq!(booth.retake(0), Err(SessionError::NotInReview));
    assert_eq!(booth.take_retake_shot(), Err(SessionError::NotRetaking));

    complete_sequence(&mut booth, &mut events).await;
    assert_eq!(booth.retake(3), Err(SessionError::InvalidSlot(3)));
    assert_eq!(booth.mode(), BoothMode::Review);
}

#[tokio::test(start_paused = true)]
async fn test_start_over_cancels_pending_countdown() {
    let (mut booth, mut events) = booth_with(rgb_camera(), Arc::default());

    booth.start_sequence().unwrap();
    let tick = events.recv().await.unwrap();
    booth.handle_event(tick);
    assert_eq!(booth.session().countdown, Some(2));

    booth.start_over();
    assert_eq!(booth.mode(), BoothMode::Idle);
    assert_eq!(booth.session().countdown, None);
    assert!(!booth.is_busy());

    tokio::time::sleep(Duration::from_secs(10)).await;
    while let Ok(event) = events.try_recv() {
        booth.handle_event(event);
    }
    assert_eq!(booth.mode(), BoothMode::Idle);
    assert_eq!(booth.session().filled_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_timer_events_are_ignored() {
    let (mut booth, _events) = booth_with(rgb_camera(), Arc::default());

    booth.start_sequence().unwrap();
    booth.start_over();
    for generation in 0..8 {
        booth.handle_event(BoothEvent::CountdownElapsed { generation });
        booth.handle_event(BoothEvent::PauseElapsed { generation });
    }

    assert_eq!(booth.mode(), BoothMode::Idle);
    assert_eq!(booth.session().filled_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_new_sequence_clears_email_and_sent() {
    let sender = Arc::new(RecordingSender::default());
    let (mut booth, mut events) = booth_with(rgb_camera(), sender.clone());
    complete_sequence(&mut booth, &mut events).await;

    booth.set_email("guest@example.com").unwrap();
    booth.send_email().unwrap();
    run_until(&mut booth, &mut events, |b| !b.session().is_sending()).await;
    assert_eq!(booth.session().send_status, SendStatus::Sent);

    booth.start_sequence().unwrap();
    assert!(booth.session().email.is_empty());
    assert_eq!(booth.session().send_status, SendStatus::Idle);
    assert_eq!(booth.session().filled_count(), 0);
    assert_eq!(booth.mode(), BoothMode::Capturing(0));
}

#[tokio::test(start_paused = true)]
async fn test_send_posts_composed_strip() {
    let sender = Arc::new(RecordingSender::default());
    let (mut booth, mut events) = booth_with(rgb_camera(), sender.clone());
    complete_sequence(&mut booth, &mut events).await;

    booth.set_email(" guest@example.com ").unwrap();
    booth.send_email().unwrap();
    assert_eq!(booth.session().send_status, SendStatus::Sending);
    assert_eq!(booth.send_email(), Err(SessionError::SendInFlight));

    run_until(&mut booth, &mut events, |b| !b.session().is_sending()).await;
    assert_eq!(booth.session().send_status, SendStatus::Sent);
    assert_eq!(booth.send_email(), Err(SessionError::AlreadySent));

    let calls = sender.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "guest@example.com");
    let strip = image::load_from_memory(&calls[0].1).unwrap();
    assert_eq!((strip.width(), strip.height()), (40, 90));
}

#[tokio::test(start_paused = true)]
async fn test_empty_email_never_sends() {
    let sender = Arc::new(RecordingSender::default());
    let (mut booth, mut events) = booth_with(rgb_camera(), sender.clone());
    complete_sequence(&mut booth, &mut events).await;

    assert_eq!(booth.send_email(), Err(SessionError::EmptyEmail));
    booth.set_email("   ").unwrap();
    assert_eq!(booth.send_email(), Err(SessionError::EmptyEmail));

    tokio::task::yield_now().await;
    assert_eq!(sender.call_count(), 0);
    assert_eq!(booth.session().send_status, SendStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_email_controls_only_in_review() {
    let sender = Arc::new(RecordingSender::default());
    let (mut booth, _events) = booth_with(rgb_camera(), sender.clone());

    assert_eq!(
        booth.set_email("guest@example.com"),
        Err(SessionError::NotInReview)
    );
    assert_eq!(booth.send_email(), Err(SessionError::NotInReview));
    assert_eq!(booth.download(), Err(SessionError::NotInReview));
    assert_eq!(sender.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_send_failure_alerts_and_allows_retry() {
    let sender = Arc::new(RecordingSender::failing());
    let (mut booth, mut events) = booth_with(rgb_camera(), sender.clone());
    complete_sequence(&mut booth, &mut events).await;

    booth.set_email("guest@example.com").unwrap();
    booth.send_email().unwrap();
    run_until(&mut booth, &mut events, |b| !b.session().is_sending()).await;

    assert_eq!(booth.session().send_status, SendStatus::Idle);
    assert!(booth.alert().is_some());

    booth.dismiss_alert();
    assert!(booth.alert().is_none());
    booth.send_email().unwrap();
    run_until(&mut booth, &mut events, |b| !b.session().is_sending()).await;
    assert_eq!(sender.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_send_result_of_old_session_is_ignored() {
    let sender = Arc::new(RecordingSender::default());
    let (mut booth, mut events) = booth_with(rgb_camera(), sender.clone());
    complete_sequence(&mut booth, &mut events).await;

    booth.set_email("guest@example.com").unwrap();
    booth.send_email().unwrap();
    booth.start_over();

    let event = events.recv().await.unwrap();
    assert!(matches!(event, BoothEvent::SendFinished { .. }));
    booth.handle_event(event);
    assert_eq!(booth.session().send_status, SendStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_booth_without_camera_is_inert() {
    let (mut booth, _events) = booth_with(None, Arc::default());

    assert!(!booth.has_camera());
    assert_eq!(booth.start_sequence(), Err(SessionError::CameraUnavailable));
    assert_eq!(booth.mode(), BoothMode::Idle);
    assert!(!booth.is_busy());
}

#[tokio::test(start_paused = true)]
async fn test_missing_frames_leave_slots_empty() {
    let (mut booth, mut events) = booth_with(Some(Box::new(DarkCamera)), Arc::default());

    booth.start_sequence().unwrap();
    run_until(&mut booth, &mut events, |b| {
        !b.is_busy() && b.mode() != BoothMode::Capturing(0)
    })
    .await;

    assert_eq!(booth.mode(), BoothMode::Retaking(0));
    assert_eq!(booth.session().filled_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_download_writes_strip() {
    let tmp = tempfile::tempdir().unwrap();
    let (mut booth, mut events) = Booth::new(
        rgb_camera(),
        small_compositor(),
        Arc::new(RecordingSender::default()),
        settings(tmp.path().to_path_buf()),
    );
    complete_sequence(&mut booth, &mut events).await;

    booth.download().unwrap();
    assert!(booth.is_downloading());
    run_until(&mut booth, &mut events, |b| !b.is_downloading()).await;

    let path = booth.last_saved().expect("strip path").clone();
    assert!(path.starts_with(tmp.path()));
    let strip = image::open(&path).unwrap();
    assert_eq!((strip.width(), strip.height()), (40, 90));
}

#[tokio::test(start_paused = true)]
async fn test_second_download_is_refused_while_saving() {
    let tmp = tempfile::tempdir().unwrap();
    let (mut booth, mut events) = Booth::new(
        rgb_camera(),
        small_compositor(),
        Arc::new(RecordingSender::default()),
        settings(tmp.path().to_path_buf()),
    );
    complete_sequence(&mut booth, &mut events).await;

    booth.download().unwrap();
    assert_eq!(booth.download(), Err(SessionError::DownloadInFlight));
    run_until(&mut booth, &mut events, |b| !b.is_downloading()).await;

    let saved = std::fs::read_dir(tmp.path()).unwrap().count();
    assert_eq!(saved, 1);

    // Allowed again once the first write finished
    booth.download().unwrap();
    run_until(&mut booth, &mut events, |b| !b.is_downloading()).await;
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_retake_is_refused_while_sending() {
    let sender = Arc::new(RecordingSender::default());
    let (mut booth, mut events) = booth_with(rgb_camera(), sender.clone());
    complete_sequence(&mut booth, &mut events).await;
    let before = booth.session().shots[1].as_ref().unwrap().id;

    booth.set_email("guest@example.com").unwrap();
    booth.send_email().unwrap();
    assert_eq!(booth.retake(1), Err(SessionError::SendInFlight));
    assert_eq!(booth.mode(), BoothMode::Review);
    assert_eq!(booth.session().shots[1].as_ref().unwrap().id, before);

    run_until(&mut booth, &mut events, |b| !b.session().is_sending()).await;
    assert_eq!(booth.session().send_status, SendStatus::Sent);
    booth.retake(1).unwrap();
    assert_eq!(booth.mode(), BoothMode::Retaking(1));
}
