use thiserror::Error;

mod cd;
pub mod history;

pub use cd::CdCommand;

use crate::input::HistoryError;
use crate::process::ProcessError;

pub const CD: &str = "cd";
pub const EXIT: &str = "exit";
pub const LIST_HISTORY: &str = "!history";
pub const REPLAY_INDEX: char = '#';
pub const REPLAY_MATCH: char = '!';

/// Conditions reported to the user while the session carries on.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}: No such file or directory")]
    NoSuchDirectory(String),

    #[error("Invalid Index")]
    InvalidIndex,

    #[error("No Match")]
    NoMatch,

    #[error("{0}: not found")]
    ExecFailed(String),

    #[error("Replay depth limit ({0}) exceeded")]
    ReplayDepthExceeded(usize),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Failed to save history: {0}")]
    History(#[from] HistoryError),
}

/// How a tokenized line is handled. Borrowed parts point into the tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin<'a> {
    Cd(&'a str),
    Exit,
    ListHistory,
    ReplayIndex(&'a str),
    ReplayMatch(&'a str),
    External,
}

impl Builtin<'_> {
    /// Whether the typed line itself goes into the history log. Replays log
    /// nothing themselves; whatever they resolve to is logged on dispatch.
    pub fn is_logged(&self) -> bool {
        matches!(self, Builtin::Cd(_) | Builtin::Exit | Builtin::External)
    }
}

/// First match wins, in this order: `cd <dir>`, `exit`, `!history`,
/// `#<n>`, `!<text>`. Anything else, including `cd` with the wrong arity,
/// is external.
pub fn classify(args: &[String]) -> Builtin<'_> {
    match args {
        [cmd, dir] if cmd == CD => Builtin::Cd(dir),
        [cmd] if cmd == EXIT => Builtin::Exit,
        [cmd] if cmd == LIST_HISTORY => Builtin::ListHistory,
        [cmd] if cmd.starts_with(REPLAY_INDEX) => Builtin::ReplayIndex(cmd),
        [cmd] => match cmd.strip_prefix(REPLAY_MATCH) {
            Some(needle) => Builtin::ReplayMatch(needle),
            None => Builtin::External,
        },
        _ => Builtin::External,
    }
}
