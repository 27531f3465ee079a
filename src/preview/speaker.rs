// Stream a rendered preview through the default output device and block
// until it has played out (or the token is cancelled).

use std::time::Duration;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::RecvTimeoutError;
use log::error;

use crate::playback::CancelToken;

pub fn play(samples: Vec<f32>, sample_rate: u32, cancel: &CancelToken) -> anyhow::Result<()> {
    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let supported = device.default_output_config().context("no default output config")?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        anyhow::bail!("unsupported sample format (only f32 supported for now)");
    }

    let mut config: cpal::StreamConfig = supported.into();
    config.sample_rate = sample_rate;
    let channels = config.channels as usize;

    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let total = samples.len();
    let mut pos = 0usize;

    let err_fn = |err| error!("preview output stream error: {err}");

    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _info| {
            for frame in data.chunks_mut(channels) { // mono, copied to every channel
                frame.fill(samples.get(pos).copied().unwrap_or(0.0));
                pos += 1;
            }
            if pos >= total {
                let _ = done_tx.try_send(());
            }
        },
        err_fn,
        None,
    )?;
    stream.play().context("failed to play output stream")?;

    loop {
        match done_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) if cancel.is_cancelled() => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
    Ok(())
}
