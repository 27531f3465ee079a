use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use log::debug;

static RAW_MODE: AtomicBool = AtomicBool::new(false);

// Raw mode turns Ctrl-C into a key event we can read, so an abort still
// reaches the scheduler and the controllers get stopped.
pub struct RawModeGuard;

impl RawModeGuard {
    /// `None` when stdin is not a terminal or raw mode could not be entered.
    pub fn enable() -> Option<Self> {
        if !std::io::stdin().is_terminal() {
            return None;
        }
        terminal::enable_raw_mode().ok()?;
        RAW_MODE.store(true, Ordering::SeqCst);
        Some(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        RAW_MODE.store(false, Ordering::SeqCst);
    }
}

/// Line terminator for anything printed to the terminal right now.
pub fn line_ending() -> &'static str {
    line_ending_for(RAW_MODE.load(Ordering::SeqCst))
}

// raw mode does no \n -> \r\n translation
fn line_ending_for(raw: bool) -> &'static str {
    if raw { "\r\n" } else { "\n" }
}

// poll the terminal for an abort key (Esc, q, Ctrl-C) for up to `timeout`.
// Expects raw mode, where Ctrl-C arrives as a key instead of a signal.
pub fn poll_abort(timeout: Duration) -> anyhow::Result<bool> {
    if !event::poll(timeout)? {
        return Ok(false);
    }
    if let Event::Key(key) = event::read()? {
        return Ok(is_abort(&key));
    }
    Ok(false)
}

/// Like [`poll_abort`], but a terminal error counts as "no abort" and still
/// waits out `timeout`, so a caller looping on it never spins.
pub fn watch_abort(timeout: Duration) -> bool {
    match poll_abort(timeout) {
        Ok(aborted) => aborted,
        Err(e) => {
            debug!("abort key poll failed: {e:#}");
            thread::sleep(timeout);
            false
        }
    }
}

pub fn is_abort(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
