use std::path::PathBuf;

use crate::input::{History, HistoryError};

/// Mutable state shared by the read loop and every dispatch frame.
pub struct Session {
    pub history: History,
    history_file: Option<PathBuf>,
    running: bool,
    pending_replay: Option<Vec<String>>,
}

impl Session {
    pub fn new(history: History, history_file: Option<PathBuf>) -> Self {
        Session {
            history,
            history_file,
            running: true,
            pending_replay: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stops the loop and, if a history file was given at startup, writes
    /// the log back to it. The session stops even when the save fails.
    pub fn quit(&mut self) -> Result<(), HistoryError> {
        self.running = false;
        match &self.history_file {
            Some(path) => self.history.save(path),
            None => Ok(()),
        }
    }

    /// Hands the argument vector of a replay frame to the launch path.
    /// Single slot: a stale vector still sitting here is dropped.
    pub fn post_replay(&mut self, args: Vec<String>) {
        if let Some(stale) = self.pending_replay.replace(args) {
            tracing::debug!(?stale, "dropping unclaimed replay vector");
        }
    }

    pub fn take_replay(&mut self) -> Option<Vec<String>> {
        self.pending_replay.take()
    }

    #[cfg(test)]
    pub fn has_pending_replay(&self) -> bool {
        self.pending_replay.is_some()
    }
}
