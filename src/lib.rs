// Joy-Con rumble playback: encode dual-band control frames into the
// controller's rumble bytes and stream them to devices at a fixed frame rate.

pub mod config;
pub mod input;
pub mod playback;
pub mod preview;
pub mod rumble;
pub mod sequence;
pub mod shared;
pub mod transport;

pub use playback::{CancelToken, Outcome, PlaybackError, PlaybackReport, Scheduler};
pub use rumble::{ControlFrame, IDLE_PAYLOAD, RumblePayload, encode_payload};
pub use sequence::CommandSequence;
pub use transport::{Transport, TransportError};
