use thiserror::Error;

use crate::config::ConfigError;
use crate::input::history::HistoryError;
use crate::process::ProcessError;

/// Fatal conditions. Anything surfacing as a `ShellError` ends the process
/// before (or instead of) entering the read loop.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Unable to open script file!")]
    ScriptFile(#[source] std::io::Error),

    #[error("Flag error: {0}")]
    Flag(String),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),
}
