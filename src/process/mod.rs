use thiserror::Error;

pub mod executor;
pub mod signal;

pub use executor::ProcessExecutor;
pub use signal::Reaper;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Fork Failed!")]
    ForkFailed(#[source] std::io::Error),

    #[error("Failed to wait on child")]
    WaitFailed(#[source] std::io::Error),

    #[error("{0}: argument contains a NUL byte")]
    InvalidArgument(String),

    #[error("empty command")]
    EmptyCommand,

    #[error("Signal error: {0}")]
    Signal(String),
}

impl From<ctrlc::Error> for ProcessError {
    fn from(err: ctrlc::Error) -> Self {
        ProcessError::Signal(err.to_string())
    }
}

/// What became of a launch request, as seen by the process that asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    /// A foreground child ran to completion. `code` is `None` when it did
    /// not exit normally (killed by a signal).
    Finished { pid: libc::pid_t, code: Option<i32> },
    /// A background child was started and left running.
    Background { pid: libc::pid_t },
    /// Returned inside the forked child when the program image could not be
    /// replaced. The caller is the child and must unwind and exit.
    ExecFailed,
}

/// Starts external programs on behalf of the dispatcher.
pub trait Launcher {
    /// `args[0]` names the program, resolved through `PATH`.
    fn launch(&mut self, args: &[String], background: bool) -> Result<Launched, ProcessError>;

    /// Collects background children that have terminated since the last call.
    fn reap_finished(&mut self) -> usize {
        0
    }
}
