// Values the Joy-Con actuators pin down for us.
//
// The rumble hardware is two linear resonant actuators per controller:
//   HF  // the "high band" actuator, encoded in byte 0 and the top of byte 1
//   LF  // the "low band" actuator, encoded in byte 2 and byte 3
//
// Everything that has to agree with the actuator registers lives here so the
// codec, the scheduler and the preview synth all read the same numbers.

// Ceiling the frequency fields can represent. Anything above is clamped.
pub const MAX_FREQ_HZ: f64 = 1252.0;

// Below this a band is motor-silent regardless of amplitude.
pub const MIN_FREQ_HZ: f64 = 10.0;

pub const MAX_AMP: f64 = 1.0;

// One sub-command drives one actuator pair; the payload doubles it.
pub const SUBCOMMAND_LEN: usize = 4;
pub const PAYLOAD_LEN: usize = 8;

pub const DEFAULT_FPS: f64 = 66.0;
pub const DEFAULT_PREVIEW_RATE: u32 = 44100;

// Which actuator a frequency belongs to. The two bands use disjoint code ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Band {
    High,
    Low,
}

impl Band {
    // Offset subtracted from the raw log step before packing.
    pub fn step_offset(self) -> i32 {
        match self {
            Band::High => 0x60,
            Band::Low => 0x40,
        }
    }
}
