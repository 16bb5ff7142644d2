//! # Input History
//!
//! Bridges prompt input lines to a durable file across process lifetimes.
//!
//! `PromptSession` owns the line editor and the configured history path.
//! The file is loaded once at construction and the full entry list is
//! written back on drop, so history reaches disk on every exit path of
//! the conversation loop (exit token, Ctrl-C, Ctrl-D, or an error
//! return). All history I/O failures degrade to log warnings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{DefaultEditor, Editor};

/// Entries kept in memory; effectively unbounded for an interactive session.
const HISTORY_CAPACITY: usize = 10_000;

/// A line editor bound to a history file.
pub struct PromptSession {
    editor: DefaultEditor,
    path: PathBuf,
}

impl PromptSession {
    /// Opens the editor and loads prior history from `path`, if any.
    /// A missing file means "no prior history", not an error.
    pub fn open(path: &Path) -> rustyline::Result<Self> {
        let config = Config::builder()
            .max_history_size(HISTORY_CAPACITY)?
            .history_ignore_dups(false)?
            .build();
        let history = FileHistory::with_config(config.clone());
        let mut editor: DefaultEditor = Editor::with_history(config, history)?;

        match editor.load_history(path) {
            Ok(()) => debug!("Loaded input history from {}", path.display()),
            Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No history file at {}, starting fresh", path.display());
            }
            Err(e) => warn!("Failed to load history from {}: {}", path.display(), e),
        }

        Ok(Self {
            editor,
            path: path.to_path_buf(),
        })
    }

    /// Blocking read of one input line.
    pub fn readline(&mut self, prompt: &str) -> rustyline::Result<String> {
        self.editor.readline(prompt)
    }

    /// Records a submitted line for up/down recall and for the history file.
    pub fn remember(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            warn!("Failed to record history entry: {}", e);
        }
    }
}

impl Drop for PromptSession {
    fn drop(&mut self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(e) = self.editor.save_history(&self.path) {
            warn!("Failed to save history to {}: {}", self.path.display(), e);
        } else {
            debug!("Saved input history to {}", self.path.display());
        }
    }
}
