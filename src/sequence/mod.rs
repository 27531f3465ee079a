// An ordered run of control frames plus the rate they were sampled at.
// Built once from whatever the analysis side produced, then read-only.

use std::time::Duration;

use thiserror::Error;

use crate::rumble::ControlFrame;

pub mod csv;
pub mod persistence;

pub use persistence::{SequenceFormat, load_sequence, save_sequence};

#[derive(Error, Debug)]
pub enum SequenceError {
    // `row` is the 1-based line for CSV input, the 1-based frame for JSON
    #[error("row {row}: expected 4 values, found {found}")]
    Arity { row: usize, found: usize },

    #[error("row {row}, column {column}: {value:?} is not a number")]
    NotANumber { row: usize, column: usize, value: String },

    #[error("row {row}, column {column}: value is not finite")]
    NonFinite { row: usize, column: usize },

    #[error("invalid frame rate: {0}")]
    InvalidFrameRate(f64),

    #[error("sequence has no frames")]
    Empty,

    #[error("unrecognised sequence file extension: {0:?}")]
    UnknownFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommandSequence {
    fps: f64,
    frames: Vec<ControlFrame>,
}

impl CommandSequence {
    pub fn new(fps: f64, frames: Vec<ControlFrame>) -> Result<Self, SequenceError> {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(SequenceError::InvalidFrameRate(fps));
        }
        if frames.is_empty() {
            return Err(SequenceError::Empty);
        }
        // the whole run has to fit in a Duration
        if Duration::try_from_secs_f64(frames.len() as f64 / fps).is_err() {
            return Err(SequenceError::InvalidFrameRate(fps));
        }
        for (i, f) in frames.iter().enumerate() {
            if let Some(column) = f.to_array().iter().position(|v| !v.is_finite()) {
                return Err(SequenceError::NonFinite { row: i + 1, column: column + 1 });
            }
        }
        Ok(Self { fps, frames })
    }

    /// Build from loose rows. Every row must hold exactly four values;
    /// one bad row rejects the whole sequence.
    pub fn from_rows<R: AsRef<[f64]>>(fps: f64, rows: &[R]) -> Result<Self, SequenceError> {
        let mut frames = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let values: [f64; 4] = row
                .try_into()
                .map_err(|_| SequenceError::Arity { row: i + 1, found: row.len() })?;
            frames.push(ControlFrame::from(values));
        }
        Self::new(fps, frames)
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frames(&self) -> &[ControlFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps)
    }

    /// Nominal wall-clock length of a full playback.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames.len() as f64 / self.fps)
    }

    /// Same frames, different rate.
    pub fn with_fps(self, fps: f64) -> Result<Self, SequenceError> {
        Self::new(fps, self.frames)
    }
}
