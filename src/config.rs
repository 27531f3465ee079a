// Tool settings, read on startup from <dir>/.joyrumble/config.json.
// A missing or unreadable file just means defaults; CLI flags win over both.
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::playback::{FaultPolicy, Pacing, Scheduler};
use crate::shared::{DEFAULT_FPS, DEFAULT_PREVIEW_RATE};

const JOYRUMBLE_DIR: &str = ".joyrumble";
const CONFIG_FILE: &str = "config.json";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PacingMode {
    #[default]
    Spin,
    Hybrid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fps: f64,
    pub pacing: PacingMode,
    pub spin_window_us: u64, // hybrid only: how long before a deadline to stop sleeping
    pub fault_policy: FaultPolicy,
    pub slow_send_warn_ms: Option<f64>,
    pub preview_sample_rate: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            pacing: PacingMode::Spin,
            spin_window_us: 2000,
            fault_policy: FaultPolicy::ContinueOthers,
            slow_send_warn_ms: None,
            preview_sample_rate: DEFAULT_PREVIEW_RATE,
        }
    }
}

impl Config {
    pub fn pacing(&self) -> Pacing {
        match self.pacing {
            PacingMode::Spin => Pacing::Spin,
            PacingMode::Hybrid => Pacing::Hybrid {
                spin_window: Duration::from_micros(self.spin_window_us),
            },
        }
    }

    /// A scheduler set up the way this config asks.
    pub fn scheduler(&self) -> Scheduler {
        let mut s = Scheduler::new()
            .with_pacing(self.pacing())
            .with_fault_policy(self.fault_policy);
        if let Some(ms) = self.slow_send_warn_ms.filter(|ms| ms.is_finite() && *ms > 0.0) {
            s = s.with_slow_send_warning(Duration::from_secs_f64(ms / 1000.0));
        }
        s
    }
}

// <dir>/.joyrumble/config.json
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(JOYRUMBLE_DIR).join(CONFIG_FILE)
}

pub fn load_config(dir: &Path) -> Option<Config> {
    let path = config_path(dir);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!("ignoring {}: {e}", path.display());
            None
        }
    }
}

// Write the config, making .joyrumble/ if it doesn't exist already
pub fn save_config(dir: &Path, config: &Config) -> anyhow::Result<PathBuf> {
    let path = config_path(dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_config(dir.path()), None);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            fps: 60.0,
            pacing: PacingMode::Hybrid,
            fault_policy: FaultPolicy::Abort,
            slow_send_warn_ms: Some(4.0),
            ..Config::default()
        };
        let path = save_config(dir.path(), &cfg).unwrap();
        assert!(path.ends_with(".joyrumble/config.json"));
        assert_eq!(load_config(dir.path()), Some(cfg));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "pacing": "hybrid", "fault_policy": "continue" }"#).unwrap();

        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.fps, DEFAULT_FPS);
        assert_eq!(cfg.fault_policy, FaultPolicy::ContinueOthers);
        assert_eq!(cfg.pacing(), Pacing::Hybrid { spin_window: Duration::from_millis(2) });
    }

    #[test]
    fn corrupt_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(dir.path()), None);
    }
}
