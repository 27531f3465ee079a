// Sequence files on disk. `.csv` is the analysis scripts' format; `.json`
// additionally carries the frame rate:
//   { "fps": 66.0, "frames": [[hf_freq, hf_amp, lf_freq, lf_amp], ...] }
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{CommandSequence, SequenceError, csv};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceFormat {
    Csv,
    Json,
}

impl SequenceFormat {
    pub fn from_path(path: &Path) -> Result<Self, SequenceError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(SequenceFormat::Csv),
            "json" => Ok(SequenceFormat::Json),
            _ => Err(SequenceError::UnknownFormat(ext)),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SequenceFile {
    fps: f64,
    frames: Vec<Vec<f64>>, // loose on purpose so arity errors point at a frame
}

pub fn parse_json(text: &str) -> Result<CommandSequence, SequenceError> {
    let file: SequenceFile = serde_json::from_str(text)?;
    CommandSequence::from_rows(file.fps, file.frames.as_slice())
}

pub fn render_json(sequence: &CommandSequence) -> Result<String, SequenceError> {
    let file = SequenceFile {
        fps: sequence.fps(),
        frames: sequence.frames().iter().map(|f| f.to_array().to_vec()).collect(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Load a sequence, picking the format from the extension. `fps` is used for
/// CSV, and for JSON only when given explicitly (it overrides the file's rate).
pub fn load_sequence(path: &Path, fps: Option<f64>, default_fps: f64) -> Result<CommandSequence, SequenceError> {
    match SequenceFormat::from_path(path)? {
        SequenceFormat::Csv => csv::load(path, fps.unwrap_or(default_fps)),
        SequenceFormat::Json => {
            let seq = parse_json(&std::fs::read_to_string(path)?)?;
            match fps {
                Some(fps) => seq.with_fps(fps),
                None => Ok(seq),
            }
        }
    }
}

// Save a sequence, creating parent directories if they don't exist already
pub fn save_sequence(path: &Path, sequence: &CommandSequence) -> Result<(), SequenceError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match SequenceFormat::from_path(path)? {
        SequenceFormat::Csv => csv::save(path, sequence),
        SequenceFormat::Json => {
            std::fs::write(path, render_json(sequence)?)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rumble::ControlFrame;
    use pretty_assertions::assert_eq;

    fn sample() -> CommandSequence {
        CommandSequence::new(
            50.0,
            vec![
                ControlFrame::new(440.0, 0.5, 100.0, 0.3),
                ControlFrame::silent(),
                ControlFrame::new(800.0, 0.12, 40.0, 1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn json_keeps_fps_and_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("song.json");
        save_sequence(&path, &sample()).unwrap();
        let loaded = load_sequence(&path, None, 66.0).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn csv_takes_fps_from_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.csv");
        save_sequence(&path, &sample()).unwrap();
        let loaded = load_sequence(&path, None, 66.0).unwrap();
        assert_eq!(loaded.fps(), 66.0);
        assert_eq!(loaded.frames(), sample().frames());
    }

    #[test]
    fn explicit_fps_overrides_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.json");
        save_sequence(&path, &sample()).unwrap();
        assert_eq!(load_sequence(&path, Some(100.0), 66.0).unwrap().fps(), 100.0);
    }

    #[test]
    fn json_frame_with_wrong_arity_is_rejected() {
        let text = r#"{ "fps": 66, "frames": [[440, 0.5, 100, 0.3], [1, 2, 3, 4, 5]] }"#;
        assert!(matches!(
            parse_json(text),
            Err(SequenceError::Arity { row: 2, found: 5 })
        ));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        assert!(matches!(
            SequenceFormat::from_path(Path::new("song.mp3")),
            Err(SequenceError::UnknownFormat(ext)) if ext == "mp3"
        ));
    }
}
