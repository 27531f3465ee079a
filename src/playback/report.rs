use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::transport::TransportError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Cancelled,
    Faulted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => write!(f, "completed"),
            Outcome::Cancelled => write!(f, "cancelled"),
            Outcome::Faulted => write!(f, "faulted"),
        }
    }
}

/// A send that did not go through. `frame` is `None` for the idle send at shutdown.
#[derive(Debug)]
pub struct DeviceFailure {
    pub device: String,
    pub frame: Option<usize>,
    pub error: TransportError,
}

#[derive(Debug)]
pub struct PlaybackReport {
    pub outcome: Outcome,
    pub frames_total: usize,
    pub frames_sent: usize, // content frames fanned out; excludes the idle frame
    pub elapsed: Duration,
    pub late_frames: usize,
    pub worst_lateness: Duration,
    pub failures: Vec<DeviceFailure>,
}

impl PlaybackReport {
    /// Distinct names of devices that failed at least once, in first-failure order.
    pub fn failed_devices(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for f in &self.failures {
            if !names.contains(&f.device.as_str()) {
                names.push(&f.device);
            }
        }
        names
    }
}

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("no devices to play on")]
    NoDevices,

    #[error("invalid frame rate: {0}")]
    InvalidFrameRate(f64),

    // only ever returned after every device has been sent the idle payload
    #[error("playback faulted on {}", .0.failed_devices().join(", "))]
    Faulted(Box<PlaybackReport>),
}

/// Progress notifications for whoever is watching a run.
#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackEvent {
    Started { frames: usize, devices: usize },
    Frame { index: usize },
    DeviceFault { device: String, frame: Option<usize> },
    Finished { outcome: Outcome },
}
