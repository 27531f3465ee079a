mod cli;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use cli::{Cli, Commands, ConfigAction};
use joyrumble::config::{self, Config};
use joyrumble::input::{self, RawModeGuard};
use joyrumble::playback::{self, CancelToken, FaultPolicy, PlaybackError, PlaybackEvent, PlaybackReport, Scheduler};
use joyrumble::preview;
use joyrumble::rumble::{ControlFrame, encode_payload};
use joyrumble::sequence::{self, CommandSequence};
use joyrumble::transport::{self, MemoryTransport, Transport};

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            write!(
                buf,
                "[{} {:<5} {}] {}{}",
                buf.timestamp(),
                record.level(),
                record.target(),
                record.args(),
                input::line_ending()
            )
        })
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let dir: PathBuf = cli
        .dir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let mut cfg = config::load_config(&dir).unwrap_or_default();

    match cli.command {
        Commands::Play { sequence, fps, dry_run, pacing, abort_on_fault, slow_send_warn_ms } => {
            if let Some(p) = pacing {
                cfg.pacing = p;
            }
            if abort_on_fault {
                cfg.fault_policy = FaultPolicy::Abort;
            }
            if slow_send_warn_ms.is_some() {
                cfg.slow_send_warn_ms = slow_send_warn_ms;
            }
            let seq = load(&sequence, fps, &cfg)?;
            let devices = open_devices(dry_run)?;
            play(seq, devices, cfg.scheduler())
        }
        Commands::Stop { dry_run } => {
            let mut devices = open_devices(dry_run)?;
            let failures = transport::stop_all(&mut devices);
            if failures.is_empty() {
                info!("stopped {} device(s)", devices.len());
                Ok(())
            } else {
                let names: Vec<_> = failures.iter().map(|f| f.device.as_str()).collect();
                anyhow::bail!("could not stop {}", names.join(", "))
            }
        }
        Commands::Encode { hf_freq, hf_amp, lf_freq, lf_amp } => {
            let frame = ControlFrame::new(hf_freq, hf_amp, lf_freq, lf_amp);
            println!("{}", encode_payload(&frame));
            Ok(())
        }
        Commands::Preview { sequence, output, fps, play } => {
            let seq = load(&sequence, fps, &cfg)?;
            let rate = cfg.preview_sample_rate;
            let samples = preview::synthesize(&seq, rate);
            let out = output.unwrap_or_else(|| sequence.with_extension("wav"));
            preview::write_wav(&out, &samples, rate)?;
            info!("wrote {} ({:.1}s)", out.display(), samples.len() as f64 / rate as f64);
            if play {
                play_preview(samples, rate)?;
            }
            Ok(())
        }
        Commands::Convert { input, output, fps } => {
            let seq = load(&input, fps, &cfg)?;
            sequence::save_sequence(&output, &seq)
                .with_context(|| format!("could not write {}", output.display()))?;
            info!("wrote {} frames to {}", seq.len(), output.display());
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => {
                let path = config::config_path(&dir);
                if path.exists() && !force {
                    anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
                }
                let path = config::save_config(&dir, &Config::default())?;
                println!("wrote {}", path.display());
                Ok(())
            }
            ConfigAction::Show => {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
                Ok(())
            }
        },
    }
}

fn load(path: &Path, fps: Option<f64>, cfg: &Config) -> anyhow::Result<CommandSequence> {
    let seq = sequence::load_sequence(path, fps, cfg.fps)
        .with_context(|| format!("could not load {}", path.display()))?;
    info!("loaded {} frames ({:.1}s at {} fps)", seq.len(), seq.duration().as_secs_f64(), seq.fps());
    Ok(seq)
}

fn open_devices(dry_run: Option<usize>) -> anyhow::Result<Vec<Box<dyn Transport>>> {
    match dry_run {
        Some(n) => Ok((0..n.max(1))
            .map(|i| Box::new(MemoryTransport::new(format!("sim-{i}"))) as Box<dyn Transport>)
            .collect()),
        None => open_joycons(),
    }
}

#[cfg(feature = "hid")]
fn open_joycons() -> anyhow::Result<Vec<Box<dyn Transport>>> {
    let pads = transport::connect_joycons()?;
    anyhow::ensure!(!pads.is_empty(), "no controllable Joy-Cons found, check Bluetooth pairing");
    Ok(pads.into_iter().map(|p| Box::new(p) as Box<dyn Transport>).collect())
}

#[cfg(not(feature = "hid"))]
fn open_joycons() -> anyhow::Result<Vec<Box<dyn Transport>>> {
    anyhow::bail!("built without the `hid` feature; use --dry-run N to simulate devices")
}

#[cfg(feature = "speaker")]
fn play_preview(samples: Vec<f32>, rate: u32) -> anyhow::Result<()> {
    let cancel = CancelToken::new();
    playback::cancel_on_signal(&cancel).context("could not install the interrupt handler")?;
    preview::play(samples, rate, &cancel)
}

#[cfg(not(feature = "speaker"))]
fn play_preview(_samples: Vec<f32>, _rate: u32) -> anyhow::Result<()> {
    anyhow::bail!("built without the `speaker` feature; open the WAV instead")
}

// Playback runs on its own thread so this one can watch the keyboard.
fn play(seq: CommandSequence, mut devices: Vec<Box<dyn Transport>>, scheduler: Scheduler) -> anyhow::Result<()> {
    let cancel = CancelToken::new();
    playback::cancel_on_signal(&cancel).context("could not install the interrupt handler")?;
    let (tx, rx) = crossbeam_channel::bounded::<PlaybackEvent>(1024);
    let total = seq.len();
    let progress_every = (seq.fps().round() as usize).max(1);

    let keys = RawModeGuard::enable(); // auto drops when out of scope
    if keys.is_none() {
        warn!("not attached to a terminal, abort keys unavailable (SIGINT still stops playback)");
    }

    let worker = {
        let cancel = cancel.clone();
        let scheduler = scheduler.with_events(tx);
        thread::Builder::new()
            .name("playback".into())
            .spawn(move || scheduler.play(&seq, &mut devices, &cancel))?
    };

    let mut stdout = std::io::stdout();
    while !worker.is_finished() {
        let aborted = if keys.is_some() {
            input::watch_abort(Duration::from_millis(10))
        } else {
            thread::sleep(Duration::from_millis(10));
            false
        };
        if aborted && !cancel.is_cancelled() {
            info!("abort key pressed, stopping playback");
            cancel.cancel();
        }
        for event in rx.try_iter() {
            if let PlaybackEvent::Frame { index } = event {
                if (index + 1) % progress_every == 0 || index + 1 == total {
                    let _ = write!(stdout, "\rframe {}/{}", index + 1, total);
                    let _ = stdout.flush();
                }
            }
        }
    }
    drop(keys);
    println!();

    let result = worker
        .join()
        .map_err(|_| anyhow::anyhow!("playback thread panicked"))?;
    match result {
        Ok(report) => {
            summarize(&report);
            Ok(())
        }
        Err(PlaybackError::Faulted(report)) => {
            summarize(&report);
            for f in &report.failures {
                match f.frame {
                    Some(i) => eprintln!("  {}: frame {}: {}", f.device, i, f.error),
                    None => eprintln!("  {}: idle: {}", f.device, f.error),
                }
            }
            anyhow::bail!("playback faulted on {}", report.failed_devices().join(", "))
        }
        Err(e) => Err(e.into()),
    }
}

fn summarize(report: &PlaybackReport) {
    println!(
        "{}: {}/{} frames in {:.2}s ({} late, worst {:.2}ms)",
        report.outcome,
        report.frames_sent,
        report.frames_total,
        report.elapsed.as_secs_f64(),
        report.late_frames,
        report.worst_lateness.as_secs_f64() * 1000.0,
    );
}
