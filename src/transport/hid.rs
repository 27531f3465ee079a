// Joy-Con over HID. Rumble rides in output report 0x10:
//   [0x10, packet_counter, rumble[0..8]]
// The counter is a 4-bit rolling sequence the controller uses to drop repeats.

use hidapi::{HidApi, HidDevice};
use log::{info, warn};

use super::{Transport, TransportError};
use crate::rumble::{IDLE_PAYLOAD, RumblePayload};

pub const NINTENDO_VENDOR_ID: u16 = 0x057E;
pub const JOYCON_L_PRODUCT_ID: u16 = 0x2006;
pub const JOYCON_R_PRODUCT_ID: u16 = 0x2007;

const RUMBLE_REPORT_ID: u8 = 0x10;
const SUBCOMMAND_REPORT_ID: u8 = 0x01;
const SUBCMD_ENABLE_VIBRATION: u8 = 0x48;

pub struct JoyConHid {
    name: String,
    device: HidDevice,
    packet_counter: u8,
}

impl JoyConHid {
    pub fn new(name: impl Into<String>, device: HidDevice) -> Self {
        Self {
            name: name.into(),
            device,
            packet_counter: 0,
        }
    }

    fn next_packet(&mut self) -> u8 {
        let n = self.packet_counter;
        self.packet_counter = (self.packet_counter + 1) & 0x0F;
        n
    }

    // The actuators ignore rumble reports until vibration is switched on.
    pub fn enable_vibration(&mut self) -> Result<(), TransportError> {
        let mut report = [0u8; 12];
        report[0] = SUBCOMMAND_REPORT_ID;
        report[1] = self.next_packet();
        report[2..10].copy_from_slice(IDLE_PAYLOAD.as_bytes());
        report[10] = SUBCMD_ENABLE_VIBRATION;
        report[11] = 0x01;
        self.write(&report)
    }

    fn write(&self, report: &[u8]) -> Result<(), TransportError> {
        let written = self.device.write(report)?;
        if written != report.len() {
            return Err(TransportError::Rejected {
                reason: format!("short write: {written} of {} bytes", report.len()),
            });
        }
        Ok(())
    }
}

impl Transport for JoyConHid {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, payload: &RumblePayload) -> Result<(), TransportError> {
        let mut report = [0u8; 10];
        report[0] = RUMBLE_REPORT_ID;
        report[1] = self.next_packet();
        report[2..].copy_from_slice(payload.as_bytes());
        self.write(&report)
    }
}

// Opens whichever Joy-Cons are already paired and visible. Missing sides are skipped.
pub fn connect_joycons() -> Result<Vec<JoyConHid>, TransportError> {
    let api = HidApi::new()?;
    let mut found = Vec::new();
    for (label, pid) in [("joycon-l", JOYCON_L_PRODUCT_ID), ("joycon-r", JOYCON_R_PRODUCT_ID)] {
        let device = match api.open(NINTENDO_VENDOR_ID, pid) {
            Ok(d) => d,
            Err(_) => continue,
        };
        let mut jc = JoyConHid::new(label, device);
        match jc.enable_vibration() {
            Ok(()) => {
                info!("{label}: connected");
                found.push(jc);
            }
            Err(e) => warn!("{label}: could not enable vibration: {e}"),
        }
    }
    Ok(found)
}
