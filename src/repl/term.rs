//! Terminal metrics probe.

use crossterm::terminal;

/// Height assumed when the terminal cannot report one (redirected output,
/// no controlling terminal).
pub const DEFAULT_HEIGHT: u16 = 24;

/// Current terminal height in rows. Never fails observably; all probe
/// errors collapse into [`DEFAULT_HEIGHT`].
pub fn height() -> u16 {
    height_or_default(terminal::size().ok().map(|(_cols, rows)| rows))
}

fn height_or_default(probed: Option<u16>) -> u16 {
    match probed {
        Some(rows) if rows > 0 => rows,
        _ => DEFAULT_HEIGHT,
    }
}
