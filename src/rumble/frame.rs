use serde::{Deserialize, Serialize};

use crate::shared::{MAX_AMP, MAX_FREQ_HZ};

// One timestep's target for both actuators: (frequency, amplitude) per band
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlFrame {
    pub hf_freq: f64, // Hz
    pub hf_amp: f64,  // 0..1
    pub lf_freq: f64, // Hz
    pub lf_amp: f64,  // 0..1
}

impl ControlFrame {
    pub fn new(hf_freq: f64, hf_amp: f64, lf_freq: f64, lf_amp: f64) -> Self {
        Self { hf_freq, hf_amp, lf_freq, lf_amp }
    }

    pub fn silent() -> Self { // `default` under a name that says what it means
        Self::default()
    }

    /// Both amplitudes exactly zero. The hardware has a dedicated idle pattern for this.
    pub fn is_silent(&self) -> bool {
        self.hf_amp == 0.0 && self.lf_amp == 0.0
    }

    /// Pull every field into the range the actuator registers can hold.
    /// NaN collapses to 0 so the bit layout stays well defined.
    pub fn clamped(&self) -> Self {
        Self {
            hf_freq: bound(self.hf_freq, MAX_FREQ_HZ),
            hf_amp: bound(self.hf_amp, MAX_AMP),
            lf_freq: bound(self.lf_freq, MAX_FREQ_HZ),
            lf_amp: bound(self.lf_amp, MAX_AMP),
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.hf_freq, self.hf_amp, self.lf_freq, self.lf_amp]
    }
}

impl From<[f64; 4]> for ControlFrame {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<(f64, f64, f64, f64)> for ControlFrame {
    fn from((hf_freq, hf_amp, lf_freq, lf_amp): (f64, f64, f64, f64)) -> Self {
        Self::new(hf_freq, hf_amp, lf_freq, lf_amp)
    }
}

#[inline]
fn bound(v: f64, max: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, max) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_out_of_range_fields() {
        let f = ControlFrame::new(2000.0, 1.5, -3.0, -0.2).clamped();
        assert_eq!(f, ControlFrame::new(1252.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn nan_clamps_to_zero() {
        let f = ControlFrame::new(f64::NAN, 0.5, 100.0, f64::NAN).clamped();
        assert_eq!(f.hf_freq, 0.0);
        assert_eq!(f.lf_amp, 0.0);
    }

    #[test]
    fn silence_only_looks_at_amplitudes() {
        assert!(ControlFrame::new(800.0, 0.0, 160.0, 0.0).is_silent());
        assert!(!ControlFrame::new(0.0, 0.0, 0.0, 0.01).is_silent());
        assert!(ControlFrame::silent().is_silent());
    }
}
