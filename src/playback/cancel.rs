use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

/// Cloneable abort flag. The scheduler polls it between frames and while waiting.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    // Runs on the signal thread. Repeat signals only log; the idle shutdown
    // is already under way and must not be cut short.
    fn interrupt_handler(&self) -> impl FnMut() + Send + 'static {
        let token = self.clone();
        move || {
            if token.is_cancelled() {
                warn!("already stopping, waiting for devices to go idle");
            } else {
                info!("interrupt received, stopping playback");
                token.cancel();
            }
        }
    }
}

/// Cancel `token` on SIGINT or SIGTERM (Ctrl-C or console close on Windows).
///
/// Only one handler can be installed per process.
pub fn cancel_on_signal(token: &CancelToken) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(token.interrupt_handler())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }

    #[test]
    fn interrupt_cancels_and_repeats_are_harmless() {
        let token = CancelToken::new();
        let mut on_interrupt = token.interrupt_handler();
        on_interrupt();
        assert!(token.is_cancelled());
        on_interrupt();
        assert!(token.is_cancelled());
    }
}
