// Emulates what the two actuators would sound like: one sine per band,
// amplitude and pitch stepped per frame. Phase carries across frame boundaries
// so there are no clicks where frames meet.

use std::f64::consts::TAU;

use crate::rumble::ControlFrame;
use crate::sequence::CommandSequence;

// Loudest sample after normalisation.
const PEAK: f32 = 0.5;

#[derive(Clone, Copy, Debug, Default)]
struct Oscillator {
    phase: f64,
}

impl Oscillator {
    // Adds one frame of this band into `out`. A silent band leaves the phase alone.
    fn render_into(&mut self, freq: f64, amp: f64, sample_rate: f64, out: &mut [f32]) {
        if freq <= 0.0 || amp <= 0.0 {
            return;
        }
        let phase_inc = TAU * freq / sample_rate; // radians per sample
        for s in out.iter_mut() {
            *s += (amp * self.phase.sin()) as f32;
            self.phase += phase_inc;
            if self.phase > TAU {
                self.phase -= TAU;
            }
        }
    }
}

pub fn samples_per_frame(sample_rate: u32, fps: f64) -> usize {
    (sample_rate as f64 / fps) as usize
}

/// Render the whole sequence as a mono buffer at `sample_rate`, peak-normalised to 0.5.
pub fn synthesize(sequence: &CommandSequence, sample_rate: u32) -> Vec<f32> {
    let per_frame = samples_per_frame(sample_rate, sequence.fps());
    let mut out = vec![0.0f32; per_frame * sequence.len()];
    if per_frame == 0 {
        return out;
    }

    let rate = sample_rate as f64;
    let mut hf = Oscillator::default();
    let mut lf = Oscillator::default();
    for (frame, chunk) in sequence.frames().iter().zip(out.chunks_exact_mut(per_frame)) {
        let ControlFrame { hf_freq, hf_amp, lf_freq, lf_amp } = *frame;
        hf.render_into(hf_freq, hf_amp, rate, chunk);
        lf.render_into(lf_freq, lf_amp, rate, chunk);
    }

    normalize(&mut out);
    out
}

fn normalize(buf: &mut [f32]) {
    let max = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if max > 0.0 {
        let scale = PEAK / max;
        for s in buf.iter_mut() {
            *s *= scale;
        }
    }
}
