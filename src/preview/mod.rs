// Hear a sequence without a controller: render the two actuator bands as
// sines, write them to a WAV, or stream them to the speakers.

#[cfg(feature = "speaker")]
mod speaker;
mod synth;
mod wav;

#[cfg(feature = "speaker")]
pub use speaker::play;
pub use synth::{samples_per_frame, synthesize};
pub use wav::write_wav;
