mod file_ops;

use std::path::{Path, PathBuf};

use thiserror::Error;

use self::file_ops::FileOps;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Append-only command log with stable 0-based indices.
///
/// Entries are never removed or reordered during a session, so an index
/// handed out once keeps naming the same command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        let entries = FileOps::new(path).load_entries()?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "history loaded");
        Ok(History { entries })
    }

    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let file_ops = FileOps::new(path);
        file_ops.save_entries(self.iter())?;
        tracing::debug!(path = %file_ops.path().display(), entries = self.len(), "history saved");
        Ok(())
    }

    pub fn append(&mut self, command: impl Into<String>) {
        self.entries.push(command.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for History {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        History {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}
