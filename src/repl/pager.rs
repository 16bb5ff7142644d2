//! # Pager Launcher
//!
//! Long replies are handed to `less` so they do not scroll off the
//! screen. Short replies still go through the pager, but with the flag
//! that makes it print and exit immediately instead of waiting for a
//! keypress, so the conversation flow is uninterrupted either way.

use std::io::{self, Write};
use std::process::{Command, Stdio};

use log::{debug, warn};

use super::term;

const PAGER_BIN: &str = "less";

/// Rows reserved below the reply for the next prompt.
const PROMPT_SLACK: u16 = 2;

/// Flags for one pager invocation: `-R` keeps ANSI control sequences raw,
/// `-F` makes the pager quit on its own when the text fits one screen.
fn pager_flags(line_count: usize, term_height: u16) -> Vec<&'static str> {
    let fits = line_count <= usize::from(term_height.saturating_sub(PROMPT_SLACK));
    if fits {
        vec!["-R", "-F"]
    } else {
        vec!["-R"]
    }
}

/// Spawns the pager, feeds it `text` on stdin, and waits for it to exit.
fn run_pager(program: &str, flags: &[&str], text: &str) -> io::Result<()> {
    let mut child = Command::new(program)
        .args(flags)
        .stdin(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        match stdin.write_all(text.as_bytes()) {
            Ok(()) => {}
            // The pager may exit before consuming everything (`q` early).
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                debug!("Pager exited before consuming all input");
            }
            Err(e) => warn!("Failed to feed pager: {}", e),
        }
    }

    child.wait()?;
    Ok(())
}

/// Displays `text`, paging it based on the current terminal height. Pager
/// failures (missing binary, broken pipe) degrade to printing directly;
/// the conversation loop never sees them.
pub fn show(text: &str) {
    let flags = pager_flags(text.lines().count(), term::height());
    if let Err(e) = run_pager(PAGER_BIN, &flags, text) {
        warn!("Pager unavailable ({}), printing directly", e);
        print!("{text}");
        let _ = io::stdout().flush();
    }
}
