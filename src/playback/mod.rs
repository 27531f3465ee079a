mod cancel;
mod pacer;
mod report;
mod scheduler;

pub use cancel::{CancelToken, cancel_on_signal};
pub use pacer::{Pacer, Pacing, Wait};
pub use report::{DeviceFailure, Outcome, PlaybackError, PlaybackEvent, PlaybackReport};
pub use scheduler::{FaultPolicy, Scheduler};
