use std::ffi::CString;
use std::io::{self, Write};
use std::os::raw::c_char;
use std::ptr;

use super::{Launched, Launcher, ProcessError, Reaper};
use crate::format;

/// Fork/exec launcher. Foreground children are waited on by pid;
/// background children are handed to the [`Reaper`].
pub struct ProcessExecutor {
    reaper: Reaper,
}

impl ProcessExecutor {
    pub fn new() -> Result<Self, ProcessError> {
        Ok(ProcessExecutor {
            reaper: Reaper::spawn()?,
        })
    }
}

impl Launcher for ProcessExecutor {
    fn launch(&mut self, args: &[String], background: bool) -> Result<Launched, ProcessError> {
        // Everything the child needs is built before forking.
        let argv = ArgVector::new(args)?;

        // Buffered output would otherwise be written twice, once per process.
        if let Err(e) = io::stdout().flush() {
            tracing::warn!("failed to flush stdout before fork: {}", e);
        }

        // SAFETY: the child only writes to fd 1 and calls execvp before
        // either replacing its image or unwinding to exit.
        match unsafe { libc::fork() } {
            -1 => Err(ProcessError::ForkFailed(io::Error::last_os_error())),
            0 => {
                exec_child(&argv);
                Ok(Launched::ExecFailed)
            }
            pid if background => {
                tracing::debug!(pid, program = %args[0], "started background child");
                self.reaper.track(pid);
                Ok(Launched::Background { pid })
            }
            pid => {
                tracing::debug!(pid, program = %args[0], "waiting on foreground child");
                let code = wait_for(pid)?;
                tracing::debug!(pid, ?code, "foreground child finished");
                Ok(Launched::Finished { pid, code })
            }
        }
    }

    fn reap_finished(&mut self) -> usize {
        let reaped = self.reaper.reap();
        if !reaped.is_empty() {
            tracing::debug!(?reaped, running = self.reaper.pending(), "reaped background children");
        }
        reaped.len()
    }
}

/// NUL-terminated argv for `execvp`, owning the strings it points into.
struct ArgVector {
    _strings: Vec<CString>,
    pointers: Vec<*const c_char>,
}

impl ArgVector {
    fn new(args: &[String]) -> Result<Self, ProcessError> {
        if args.is_empty() {
            return Err(ProcessError::EmptyCommand);
        }

        let strings = args
            .iter()
            .map(|arg| {
                CString::new(arg.as_str()).map_err(|_| ProcessError::InvalidArgument(arg.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut pointers: Vec<*const c_char> = strings.iter().map(|s| s.as_ptr()).collect();
        pointers.push(ptr::null());

        Ok(ArgVector {
            _strings: strings,
            pointers,
        })
    }

    fn program(&self) -> *const c_char {
        self.pointers[0]
    }

    fn as_ptr(&self) -> *const *const c_char {
        self.pointers.as_ptr()
    }
}

/// Runs in the child. Returns only if `execvp` failed.
fn exec_child(argv: &ArgVector) {
    // No allocation between fork and exec.
    let mut buf = [0u8; format::ANNOUNCEMENT_LEN];
    // SAFETY: getpid has no preconditions.
    let pid = unsafe { libc::getpid() } as u32;
    let announcement = format::command_executed(pid, &mut buf);

    // SAFETY: plain writes to stdout, then execvp with a NUL-terminated argv
    // whose strings outlive the call.
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            announcement.as_ptr().cast(),
            announcement.len(),
        );
        libc::execvp(argv.program(), argv.as_ptr());
    }
}

fn wait_for(pid: libc::pid_t) -> Result<Option<i32>, ProcessError> {
    let mut status = 0;
    loop {
        // SAFETY: `status` is a valid out-pointer for the duration of the call.
        if unsafe { libc::waitpid(pid, &mut status, 0) } != -1 {
            break;
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(ProcessError::WaitFailed(err));
        }
    }

    if libc::WIFEXITED(status) {
        Ok(Some(libc::WEXITSTATUS(status)))
    } else {
        Ok(None)
    }
}
