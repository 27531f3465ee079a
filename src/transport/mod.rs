// The one thing the scheduler needs from a controller: take 8 bytes or fail.
// Discovery, pairing and connection setup all happen before a Transport exists.

use log::{debug, error};
use thiserror::Error;

use crate::rumble::{IDLE_PAYLOAD, RumblePayload};

#[cfg(feature = "hid")]
mod hid;
mod memory;

#[cfg(feature = "hid")]
pub use hid::{JoyConHid, connect_joycons};
pub use memory::{FailureMode, MemoryTransport, SendLog, SentPayload};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("device rejected report: {reason}")]
    Rejected { reason: String },

    #[cfg(feature = "hid")]
    #[error("HID API error: {0}")]
    Hid(#[from] hidapi::HidError),
}

/// One connected controller, as seen by the scheduler.
pub trait Transport: Send {
    /// Stable label used in logs and fault reports.
    fn name(&self) -> &str;

    /// Transmit one payload atomically.
    fn send(&mut self, payload: &RumblePayload) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&mut self, payload: &RumblePayload) -> Result<(), TransportError> {
        (**self).send(payload)
    }
}

/// A device that failed to take a stop command.
#[derive(Debug)]
pub struct StopFailure {
    pub device: String,
    pub error: TransportError,
}

/// Send the idle payload once to every device. A failure on one never skips the rest.
pub fn stop_all<T: Transport>(devices: &mut [T]) -> Vec<StopFailure> {
    let mut failures = Vec::new();
    for dev in devices.iter_mut() {
        match dev.send(&IDLE_PAYLOAD) {
            Ok(()) => debug!("{}: stopped", dev.name()),
            Err(e) => {
                error!("{}: stop command failed: {e}", dev.name());
                failures.push(StopFailure {
                    device: dev.name().to_string(),
                    error: e,
                });
            }
        }
    }
    failures
}
