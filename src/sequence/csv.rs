// Plain CSV, the format the analysis scripts emit:
//
//   hf_freq,hf_amp,lf_freq,lf_amp
//   440.0,0.5,100.0,0.3
//   ...
//
// First line is always a header and skipped. Blank lines are ignored. CSV
// carries no frame rate, so the caller supplies one.

use std::fmt::Write as _;
use std::path::Path;

use super::{CommandSequence, SequenceError};
use crate::rumble::ControlFrame;

pub const HEADER: &str = "hf_freq,hf_amp,lf_freq,lf_amp";

pub fn parse(text: &str, fps: f64) -> Result<CommandSequence, SequenceError> {
    let mut frames = Vec::new();
    for (idx, line) in text.lines().enumerate().skip(1) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        frames.push(parse_row(idx + 1, line)?);
    }
    CommandSequence::new(fps, frames)
}

fn parse_row(row: usize, line: &str) -> Result<ControlFrame, SequenceError> {
    let cells: Vec<&str> = line.split(',').map(str::trim).collect();
    if cells.len() != 4 {
        return Err(SequenceError::Arity { row, found: cells.len() });
    }
    let mut values = [0.0f64; 4];
    for (col, cell) in cells.iter().enumerate() {
        let v: f64 = cell.parse().map_err(|_| SequenceError::NotANumber {
            row,
            column: col + 1,
            value: cell.to_string(),
        })?;
        if !v.is_finite() {
            return Err(SequenceError::NonFinite { row, column: col + 1 });
        }
        values[col] = v;
    }
    Ok(ControlFrame::from(values))
}

pub fn render(sequence: &CommandSequence) -> String {
    let mut out = String::with_capacity(sequence.len() * 32 + HEADER.len() + 1);
    out.push_str(HEADER);
    out.push('\n');
    for f in sequence.frames() {
        let _ = writeln!(out, "{},{},{},{}", f.hf_freq, f.hf_amp, f.lf_freq, f.lf_amp);
    }
    out
}

pub fn load(path: &Path, fps: f64) -> Result<CommandSequence, SequenceError> {
    let text = std::fs::read_to_string(path)?;
    parse(&text, fps)
}

pub fn save(path: &Path, sequence: &CommandSequence) -> Result<(), SequenceError> {
    std::fs::write(path, render(sequence))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_after_header() {
        let text = "hf_freq,hf_amp,lf_freq,lf_amp\n440,0.5,100,0.3\n\n 0 , 0 , 0 , 0 \n";
        let s = parse(text, 66.0).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.frames()[0], ControlFrame::new(440.0, 0.5, 100.0, 0.3));
        assert!(s.frames()[1].is_silent());
    }

    #[test]
    fn wrong_arity_reports_the_line() {
        let text = "h\n440,0.5,100,0.3\n440,0.5,100\n";
        match parse(text, 66.0) {
            Err(SequenceError::Arity { row: 3, found: 3 }) => {}
            other => panic!("expected arity error on line 3, got {other:?}"),
        }
    }

    #[test]
    fn garbage_cell_is_rejected() {
        let text = "h\n440,loud,100,0.3\n";
        match parse(text, 66.0) {
            Err(SequenceError::NotANumber { row: 2, column: 2, value }) => assert_eq!(value, "loud"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn inf_is_rejected() {
        assert!(matches!(
            parse("h\n440,0.5,inf,0.3\n", 66.0),
            Err(SequenceError::NonFinite { row: 2, column: 3 })
        ));
    }

    #[test]
    fn header_only_is_empty() {
        assert!(matches!(parse(HEADER, 66.0), Err(SequenceError::Empty)));
    }

    #[test]
    fn render_starts_with_header() {
        let s = CommandSequence::new(66.0, vec![ControlFrame::new(440.0, 0.5, 100.0, 0.25)]).unwrap();
        assert_eq!(render(&s), "hf_freq,hf_amp,lf_freq,lf_amp\n440,0.5,100,0.25\n");
    }
}
