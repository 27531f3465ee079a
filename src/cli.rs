use std::path::PathBuf;

use clap::{Parser, Subcommand};

use joyrumble::config::PacingMode;

/// joyrumble - play haptic command sequences on Joy-Con rumble actuators
#[derive(Parser)]
#[command(name = "joyrumble")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding .joyrumble/config.json (default: current directory)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Debug-level logging unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a sequence on every connected controller
    Play {
        /// Sequence file (.csv or .json)
        sequence: PathBuf,

        /// Frame rate; overrides the config and any rate stored in a JSON file
        #[arg(long)]
        fps: Option<f64>,

        /// Simulate this many devices instead of opening real ones
        #[arg(long, value_name = "N")]
        dry_run: Option<usize>,

        #[arg(long, value_enum)]
        pacing: Option<PacingMode>,

        /// Stop sending content as soon as any device fails
        #[arg(long)]
        abort_on_fault: bool,

        /// Warn when a single send takes longer than this many milliseconds
        #[arg(long, value_name = "MS")]
        slow_send_warn_ms: Option<f64>,
    },

    /// Send the idle payload to every connected controller
    Stop {
        #[arg(long, value_name = "N")]
        dry_run: Option<usize>,
    },

    /// Print the 8-byte payload for one control frame
    Encode {
        hf_freq: f64,
        hf_amp: f64,
        lf_freq: f64,
        lf_amp: f64,
    },

    /// Render what a sequence would sound like on the actuators
    Preview {
        sequence: PathBuf,

        /// Output WAV (default: the sequence path with a .wav extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        fps: Option<f64>,

        /// Also play it through the default output device
        #[arg(long)]
        play: bool,
    },

    /// Convert a sequence between CSV and JSON
    Convert {
        input: PathBuf,
        output: PathBuf,

        #[arg(long)]
        fps: Option<f64>,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config
    Show,
}
