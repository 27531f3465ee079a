// ControlFrame -> 4-byte sub-command -> 8-byte payload.
//
// Pure functions only: no state, no I/O, safe to call from any thread.
// Byte layout of one sub-command:
//   byte0 = hf_freq_field & 0xFF
//   byte1 = (hf_amp_code * 2 + ((hf_freq_field >> 8) & 0xFF)) & 0xFF
//   byte2 = (lf_freq_field + ((lf_amp_packed >> 8) & 0xFF)) & 0xFF
//   byte3 = lf_amp_packed & 0xFF          where lf_amp_packed = lf_amp_code / 2 + 64
// Only the low 8 bits of each intermediate survive, same as the registers.

use super::frame::ControlFrame;
use super::payload::{IDLE_SUBCOMMAND, RumblePayload};
use crate::shared::{Band, MIN_FREQ_HZ, SUBCOMMAND_LEN};

/// Encode one frame into the payload sent to a controller.
pub fn encode_payload(frame: &ControlFrame) -> RumblePayload {
    RumblePayload::doubled(encode_subcommand(frame))
}

/// Encode one frame into a single 4-byte sub-command. Out-of-range input is clamped first.
pub fn encode_subcommand(frame: &ControlFrame) -> [u8; SUBCOMMAND_LEN] {
    let f = frame.clamped();
    if f.is_silent() {
        return IDLE_SUBCOMMAND;
    }

    let hf = encode_frequency(Band::High, f.hf_freq);
    let hf_amp = encode_amplitude(f.hf_amp) * 2;
    let lf = encode_frequency(Band::Low, f.lf_freq);
    let lf_amp = encode_amplitude(f.lf_amp) / 2 + 64;

    [
        low_byte(hf),
        low_byte(hf_amp + ((hf >> 8) & 0xFF)),
        low_byte(lf + ((lf_amp >> 8) & 0xFF)),
        low_byte(lf_amp),
    ]
}

/// Semi-log frequency step: 32 steps per octave above 10 Hz, 0 below it.
pub fn frequency_step(freq: f64) -> i32 {
    if freq < MIN_FREQ_HZ {
        return 0;
    }
    quantize((freq / MIN_FREQ_HZ).log2() * 32.0)
}

/// Frequency field for one band, before byte packing. May be negative.
pub fn encode_frequency(band: Band, freq: f64) -> i32 {
    let step = frequency_step(freq) - band.step_offset();
    match band {
        Band::High => step * 4,
        Band::Low => step,
    }
}

/// Amplitude code shared by both bands. Three log-slope regions follow the
/// actuator's loudness response; the result is never negative.
pub fn encode_amplitude(amp: f64) -> i32 {
    if amp == 0.0 {
        0
    } else if amp > 0.23 {
        quantize((amp * 8.7).log2() * 32.0)
    } else if amp > 0.12 {
        quantize((amp * 17.0).log2() * 16.0)
    } else {
        quantize((amp * 120.0).log2() * 8.0).max(0)
    }
}

// Ties go to even so codes line up with the reference firmware tables.
#[inline]
fn quantize(x: f64) -> i32 {
    x.round_ties_even() as i32
}

#[inline]
fn low_byte(v: i32) -> u8 {
    (v & 0xFF) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn silent_frames_use_the_idle_pattern_for_any_frequency() {
        for (hf, lf) in [(0.0, 0.0), (440.0, 100.0), (5000.0, -20.0), (f64::NAN, 1252.0)] {
            let frame = ControlFrame::new(hf, 0.0, lf, 0.0);
            assert_eq!(encode_subcommand(&frame), IDLE_SUBCOMMAND);
        }
    }

    #[test]
    fn negative_amplitudes_clamp_into_silence() {
        let frame = ControlFrame::new(440.0, -1.0, 100.0, -0.5);
        assert_eq!(encode_subcommand(&frame), IDLE_SUBCOMMAND);
    }

    #[test]
    fn regression_vector_upper_amplitude_region() {
        let frame = ControlFrame::new(440.0, 0.5, 100.0, 0.3);

        let step_hf = ((44.0f64).log2() * 32.0).round() as i32;
        let step_lf = ((10.0f64).log2() * 32.0).round() as i32;
        assert_eq!((step_hf, step_lf), (175, 106));
        let hf_field = (step_hf - 0x60) * 4;
        let lf_field = step_lf - 0x40;
        assert_eq!(encode_frequency(Band::High, 440.0), hf_field);
        assert_eq!(encode_frequency(Band::Low, 100.0), lf_field);
        assert_eq!(encode_amplitude(0.5), 68);
        assert_eq!(encode_amplitude(0.3), 44);

        assert_eq!(encode_subcommand(&frame), [0x3c, 0x89, 0x2a, 0x56]);
    }

    #[test]
    fn regression_vector_middle_amplitude_region() {
        let frame = ControlFrame::new(440.0, 0.5, 100.0, 0.2);
        assert_eq!(encode_amplitude(0.2), 28);
        assert_eq!(encode_subcommand(&frame), [0x3c, 0x89, 0x2a, 0x4e]);
    }

    #[test]
    fn low_frequencies_are_motor_silent() {
        assert_eq!(frequency_step(9.99), 0);
        assert_eq!(frequency_step(0.0), 0);
        assert_eq!(frequency_step(10.0), 0);
        assert_eq!(frequency_step(20.0), 32);
        // a sub-10 Hz band still gets its amplitude encoded
        assert_eq!(
            encode_subcommand(&ControlFrame::new(5.0, 0.5, 5.0, 0.5)),
            [0x80, 0x86, 0xc0, 0x62]
        );
    }

    #[test]
    fn frequency_above_ceiling_matches_ceiling() {
        assert_eq!(
            encode_subcommand(&ControlFrame::new(2000.0, 0.5, 2000.0, 0.5)),
            encode_subcommand(&ControlFrame::new(1252.0, 0.5, 1252.0, 0.5)),
        );
        assert_eq!(
            encode_subcommand(&ControlFrame::new(2000.0, 0.5, 2000.0, 0.5)),
            [0xfc, 0x89, 0x9f, 0x62]
        );
    }

    #[test]
    fn amplitude_codes_per_region() {
        assert_eq!(encode_amplitude(0.0), 0);
        assert_eq!(encode_amplitude(0.001), 0); // floored, log would go negative
        assert_eq!(encode_amplitude(0.05), 21);
        assert_eq!(encode_amplitude(0.12), 31);
        assert_eq!(encode_amplitude(0.13), 18);
        assert_eq!(encode_amplitude(0.23), 31);
        assert_eq!(encode_amplitude(0.24), 34);
        assert_eq!(encode_amplitude(1.0), 100);
    }

    #[test]
    fn amplitude_is_monotonic_within_each_region() {
        for (lo, hi) in [(0.0, 0.12), (0.12, 0.23), (0.23, 1.0)] {
            let mut prev = -1;
            for i in 1..=500 {
                let amp = lo + (hi - lo) * (i as f64 / 500.0);
                let code = encode_amplitude(amp);
                assert!(code >= 0, "negative code {code} at {amp}");
                assert!(code >= prev, "code dropped at {amp}: {prev} -> {code}");
                prev = code;
            }
        }
    }

    #[test]
    fn payload_doubles_the_subcommand() {
        let frame = ControlFrame::new(320.0, 1.0, 160.0, 1.0);
        let payload = encode_payload(&frame);
        assert_eq!(payload.subcommand(), [0x00, 0xc9, 0x40, 0x72]);
        assert_eq!(&payload.as_bytes()[4..], &payload.as_bytes()[..4]);
        assert_eq!(encode_payload(&frame), payload);
    }
}
