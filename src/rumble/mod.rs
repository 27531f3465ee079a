mod codec;
mod frame;
mod payload;

pub use codec::{encode_amplitude, encode_frequency, encode_payload, encode_subcommand, frequency_step};
pub use frame::ControlFrame;
pub use payload::{IDLE_PAYLOAD, IDLE_SUBCOMMAND, RumblePayload};
