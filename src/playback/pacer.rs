// Wall-clock pacing for a fixed frame rate.
//
// Every deadline is t0 + (i + 1) / fps, computed fresh from the start instant.
// Nothing is accumulated from the previous frame, so send latency and wake-up
// jitter never add up into drift.

use std::time::{Duration, Instant};

use super::cancel::CancelToken;

// Longest single nap in hybrid mode, so cancellation is still seen promptly.
const MAX_NAP: Duration = Duration::from_millis(5);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pacing {
    #[default]
    /// Spin on the monotonic clock for the whole wait. Sub-millisecond, burns a core.
    Spin,
    /// Sleep until `spin_window` before the deadline, then spin the rest.
    Hybrid { spin_window: Duration },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wait {
    /// Deadline reached. `late` is set if it had already passed when the wait began.
    Reached { late: Option<Duration> },
    Cancelled,
}

#[derive(Clone, Copy, Debug)]
pub struct Pacer {
    t0: Instant,
    fps: f64,
    pacing: Pacing,
}

impl Pacer {
    pub fn start(fps: f64, pacing: Pacing) -> Self {
        Self::starting_at(Instant::now(), fps, pacing)
    }

    pub fn starting_at(t0: Instant, fps: f64, pacing: Pacing) -> Self {
        Self { t0, fps, pacing }
    }

    pub fn started_at(&self) -> Instant {
        self.t0
    }

    /// Absolute instant frame `index` must hold until, or `None` if that lies
    /// beyond what the clock can represent.
    pub fn deadline(&self, index: usize) -> Option<Instant> {
        let offset = Duration::try_from_secs_f64((index + 1) as f64 / self.fps).ok()?;
        self.t0.checked_add(offset)
    }

    pub fn wait_until(&self, deadline: Instant, cancel: &CancelToken) -> Wait {
        let now = Instant::now();
        if now >= deadline {
            return Wait::Reached { late: Some(now - deadline) };
        }

        if let Pacing::Hybrid { spin_window } = self.pacing {
            loop {
                if cancel.is_cancelled() {
                    return Wait::Cancelled;
                }
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining <= spin_window {
                    break;
                }
                std::thread::sleep((remaining - spin_window).min(MAX_NAP));
            }
        }

        while Instant::now() < deadline {
            if cancel.is_cancelled() {
                return Wait::Cancelled;
            }
            std::hint::spin_loop();
        }
        Wait::Reached { late: None }
    }
}
