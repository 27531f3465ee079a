// In-process stand-in for a controller. Records every payload it is handed so
// dry runs and tests can inspect what a real device would have received.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use log::trace;

use super::{Transport, TransportError};
use crate::rumble::RumblePayload;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SentPayload {
    pub payload: RumblePayload,
    pub at: Instant,
}

// Shared handle to a transport's send history; stays readable after the
// transport itself has been moved into a playback run.
#[derive(Clone, Debug, Default)]
pub struct SendLog(Arc<Mutex<Vec<SentPayload>>>);

impl SendLog {
    pub fn entries(&self) -> Vec<SentPayload> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn payloads(&self) -> Vec<RumblePayload> {
        self.entries().into_iter().map(|e| e.payload).collect()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, payload: RumblePayload) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentPayload { payload, at: Instant::now() });
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailureMode {
    #[default]
    Never,
    Always,
    // accept this many sends, then fail every one after
    After(usize),
}

type SendHook = Box<dyn FnMut(usize) + Send>;

pub struct MemoryTransport {
    name: String,
    log: SendLog,
    failure: FailureMode,
    attempts: usize,
    on_send: Option<SendHook>,
}

impl MemoryTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            log: SendLog::default(),
            failure: FailureMode::Never,
            attempts: 0,
            on_send: None,
        }
    }

    pub fn failing(mut self, mode: FailureMode) -> Self {
        self.failure = mode;
        self
    }

    /// Run `hook` after each accepted send with the number of payloads accepted so far.
    pub fn with_send_hook(mut self, hook: impl FnMut(usize) + Send + 'static) -> Self {
        self.on_send = Some(Box::new(hook));
        self
    }

    pub fn log(&self) -> SendLog {
        self.log.clone()
    }
}

impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, payload: &RumblePayload) -> Result<(), TransportError> {
        self.attempts += 1;
        let fail = match self.failure {
            FailureMode::Never => false,
            FailureMode::Always => true,
            FailureMode::After(n) => self.attempts > n,
        };
        if fail {
            return Err(TransportError::Io(format!("{}: injected failure", self.name)));
        }

        trace!("{} <- {}", self.name, payload);
        self.log.push(*payload);
        if let Some(hook) = self.on_send.as_mut() {
            hook(self.log.len());
        }
        Ok(())
    }
}
