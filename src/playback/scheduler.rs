// Walks a command sequence at its frame rate and fans every payload out to
// all devices. Idle -> Running -> {Completed | Cancelled | Faulted}, and every
// one of those ends by sending the idle payload to every device exactly once.

use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use super::cancel::CancelToken;
use super::pacer::{Pacer, Pacing, Wait};
use super::report::{DeviceFailure, Outcome, PlaybackError, PlaybackEvent, PlaybackReport};
use crate::rumble::{IDLE_PAYLOAD, RumblePayload, encode_payload};
use crate::sequence::CommandSequence;
use crate::transport::Transport;

/// What to do with the rest of a run once a device send fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Drop the failing device from later frames, keep driving the others.
    #[default]
    #[serde(rename = "continue")]
    ContinueOthers,
    /// Stop sending content after the frame that faulted.
    Abort,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    pacing: Pacing,
    fault_policy: FaultPolicy,
    slow_send: Option<Duration>,
    events: Option<Sender<PlaybackEvent>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    /// Log a warning whenever a single send takes longer than `threshold`.
    pub fn with_slow_send_warning(mut self, threshold: Duration) -> Self {
        self.slow_send = Some(threshold);
        self
    }

    pub fn with_events(mut self, tx: Sender<PlaybackEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Play `sequence` on every device in `devices`.
    ///
    /// Returns `Err(PlaybackError::Faulted)` if any send failed; that error is
    /// only produced after the idle payload has gone out to every device.
    pub fn play<T: Transport>(
        &self,
        sequence: &CommandSequence,
        devices: &mut [T],
        cancel: &CancelToken,
    ) -> Result<PlaybackReport, PlaybackError> {
        if devices.is_empty() {
            return Err(PlaybackError::NoDevices);
        }
        let fps = sequence.fps();
        if !(fps.is_finite() && fps > 0.0) {
            return Err(PlaybackError::InvalidFrameRate(fps));
        }

        let frames = sequence.frames();
        let pacer = Pacer::start(fps, self.pacing);
        // Deadlines grow with the index, so if the last one fits they all do.
        let Some(last_deadline) = pacer.deadline(frames.len().saturating_sub(1)) else {
            return Err(PlaybackError::InvalidFrameRate(fps));
        };

        info!("playing {} frames at {fps} fps on {} device(s)", frames.len(), devices.len());
        self.emit(PlaybackEvent::Started { frames: frames.len(), devices: devices.len() });
        let mut fleet = Fleet::new(devices, self.slow_send, self.events.as_ref());

        let mut cancelled = false;
        let mut frames_sent = 0;
        let mut late_frames = 0;
        let mut worst_lateness = Duration::ZERO;

        for (i, frame) in frames.iter().enumerate() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let faulted = fleet.broadcast(i, &encode_payload(frame));
            frames_sent += 1;
            self.emit(PlaybackEvent::Frame { index: i });

            if faulted && self.fault_policy == FaultPolicy::Abort {
                warn!("aborting playback after frame {i}");
                break;
            }
            if fleet.healthy() == 0 {
                warn!("every device has faulted, nothing left to drive");
                break;
            }

            let deadline = pacer.deadline(i).unwrap_or(last_deadline);
            match pacer.wait_until(deadline, cancel) {
                Wait::Cancelled => {
                    cancelled = true;
                    break;
                }
                Wait::Reached { late: Some(late) } => {
                    late_frames += 1;
                    worst_lateness = worst_lateness.max(late);
                }
                Wait::Reached { late: None } => {}
            }
        }

        fleet.shutdown();
        let failures = std::mem::take(&mut fleet.failures);
        drop(fleet);

        let outcome = if !failures.is_empty() {
            Outcome::Faulted
        } else if cancelled {
            Outcome::Cancelled
        } else {
            Outcome::Completed
        };
        let report = PlaybackReport {
            outcome,
            frames_total: frames.len(),
            frames_sent,
            elapsed: pacer.started_at().elapsed(),
            late_frames,
            worst_lateness,
            failures,
        };
        info!(
            "playback {outcome}: {}/{} frames in {:.3}s, {} late (worst {:.2}ms)",
            report.frames_sent,
            report.frames_total,
            report.elapsed.as_secs_f64(),
            report.late_frames,
            report.worst_lateness.as_secs_f64() * 1000.0,
        );
        self.emit(PlaybackEvent::Finished { outcome });

        match outcome {
            Outcome::Faulted => Err(PlaybackError::Faulted(Box::new(report))),
            _ => Ok(report),
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.try_send(event);
        }
    }
}

// The device set for one run. Dropping it without a shutdown (a panic in a
// transport, say) still stops every device.
struct Fleet<'a, T: Transport> {
    devices: &'a mut [T],
    faulted: Vec<bool>,
    failures: Vec<DeviceFailure>,
    stopped: bool,
    slow_send: Option<Duration>,
    events: Option<&'a Sender<PlaybackEvent>>,
}

impl<'a, T: Transport> Fleet<'a, T> {
    fn new(
        devices: &'a mut [T],
        slow_send: Option<Duration>,
        events: Option<&'a Sender<PlaybackEvent>>,
    ) -> Self {
        let n = devices.len();
        Self {
            devices,
            faulted: vec![false; n],
            failures: Vec::new(),
            stopped: false,
            slow_send,
            events,
        }
    }

    fn healthy(&self) -> usize {
        self.faulted.iter().filter(|f| !**f).count()
    }

    // Sequential, in device order. Returns true if any device faulted on this frame.
    fn broadcast(&mut self, index: usize, payload: &RumblePayload) -> bool {
        let mut faulted = false;
        for slot in 0..self.devices.len() {
            if self.faulted[slot] {
                continue;
            }
            if !self.send(slot, Some(index), payload) {
                self.faulted[slot] = true;
                faulted = true;
            }
        }
        faulted
    }

    // Idle to everyone, faulted devices included. Never skippable.
    fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        for slot in 0..self.devices.len() {
            if !self.send(slot, None, &IDLE_PAYLOAD) {
                error!("{}: could not send idle payload", self.devices[slot].name());
            }
        }
        debug!("idle payload sent to {} device(s)", self.devices.len());
    }

    fn send(&mut self, slot: usize, frame: Option<usize>, payload: &RumblePayload) -> bool {
        let dev = &mut self.devices[slot];
        let started = Instant::now();
        let result = dev.send(payload);
        let took = started.elapsed();
        if let Some(limit) = self.slow_send {
            if took > limit {
                warn!("{}: send took {:.2}ms", dev.name(), took.as_secs_f64() * 1000.0);
            }
        }

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("{}: send failed at frame {frame:?}: {e}", dev.name());
                let device = dev.name().to_string();
                if let Some(tx) = self.events {
                    let _ = tx.try_send(PlaybackEvent::DeviceFault { device: device.clone(), frame });
                }
                self.failures.push(DeviceFailure { device, frame, error: e });
                false
            }
        }
    }
}

impl<T: Transport> Drop for Fleet<'_, T> {
    fn drop(&mut self) {
        if !self.stopped {
            warn!("playback ended without shutdown, stopping devices");
            self.shutdown();
        }
    }
}
