use std::fmt;

use crate::shared::{PAYLOAD_LEN, SUBCOMMAND_LEN};

/// Hardware-defined "no vibration" sub-command.
pub const IDLE_SUBCOMMAND: [u8; SUBCOMMAND_LEN] = [0x00, 0x01, 0x40, 0x40];

/// The stop command. Anything that needs to force a controller quiet sends exactly this.
pub const IDLE_PAYLOAD: RumblePayload = RumblePayload::doubled(IDLE_SUBCOMMAND);

// The 8 bytes that actually go over the wire for one frame. Produced, sent and
// dropped; nothing holds on to the "current rumble".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RumblePayload([u8; PAYLOAD_LEN]);

impl RumblePayload {
    // Both physical channels of a controller side are always driven identically
    pub const fn doubled(sub: [u8; SUBCOMMAND_LEN]) -> Self {
        Self([sub[0], sub[1], sub[2], sub[3], sub[0], sub[1], sub[2], sub[3]])
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.0
    }

    pub fn subcommand(&self) -> [u8; SUBCOMMAND_LEN] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }

    pub fn is_idle(&self) -> bool {
        *self == IDLE_PAYLOAD
    }
}

impl From<RumblePayload> for [u8; PAYLOAD_LEN] {
    fn from(p: RumblePayload) -> Self {
        p.0
    }
}

impl fmt::Display for RumblePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}
