// SPDX-License-Identifier: GPL-3.0-only

//! Abortable countdown and pause timers
//!
//! Every timer carries the generation it was started for. The booth bumps
//! its generation whenever it cancels pending work, so an event that slipped
//! out of an aborted task is recognised as stale and dropped.

use super::BoothEvent;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Running timer task, aborted on drop
#[derive(Debug)]
pub struct TimerHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Count down from `seconds`, emitting a tick per remaining value and a
/// final elapsed event
///
/// The caller shows `seconds` itself; the first tick arrives one `tick`
/// later carrying `seconds - 1`.
pub fn spawn_countdown(
    events: UnboundedSender<BoothEvent>,
    generation: u64,
    seconds: u32,
    tick: Duration,
) -> TimerHandle {
    let task = tokio::spawn(async move {
        for remaining in (0..seconds).rev() {
            tokio::time::sleep(tick).await;
            let event = if remaining == 0 {
                BoothEvent::CountdownElapsed { generation }
            } else {
                BoothEvent::CountdownTick {
                    generation,
                    remaining,
                }
            };
            if events.send(event).is_err() {
                return;
            }
        }
        if seconds == 0 {
            let _ = events.send(BoothEvent::CountdownElapsed { generation });
        }
    });
    TimerHandle { generation, task }
}

/// Emit a single pause-elapsed event after `duration`
pub fn spawn_pause(
    events: UnboundedSender<BoothEvent>,
    generation: u64,
    duration: Duration,
) -> TimerHandle {
    let task = tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        let _ = events.send(BoothEvent::PauseElapsed { generation });
    });
    TimerHandle { generation, task }
}
