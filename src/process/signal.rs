use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use signal_hook::consts::SIGCHLD;
use signal_hook::iterator::{Handle, Signals};

use crate::process::ProcessError;

/// Absorbs SIGINT for the rest of the process lifetime. Installing twice is
/// not an error.
pub fn ignore_interrupts() -> Result<(), ProcessError> {
    match ctrlc::set_handler(|| {}) {
        Ok(()) | Err(ctrlc::Error::MultipleHandlers) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

type JobList = Arc<Mutex<Vec<libc::pid_t>>>;

/// Reaps background children as SIGCHLD arrives.
///
/// Only pids registered through [`track`](Reaper::track) are waited on, so a
/// foreground child's status is always left for the launcher to collect.
pub struct Reaper {
    jobs: JobList,
    handle: Handle,
    thread: Option<JoinHandle<()>>,
    owner: u32,
}

impl Reaper {
    pub fn spawn() -> Result<Self, ProcessError> {
        let mut signals =
            Signals::new([SIGCHLD]).map_err(|e| ProcessError::Signal(e.to_string()))?;
        let handle = signals.handle();
        let jobs: JobList = Arc::default();

        let thread_jobs = Arc::clone(&jobs);
        let thread = thread::Builder::new()
            .name("reaper".to_string())
            .spawn(move || {
                for _ in signals.forever() {
                    reap_jobs(&thread_jobs);
                }
            })
            .map_err(|e| ProcessError::Signal(e.to_string()))?;

        Ok(Reaper {
            jobs,
            handle,
            thread: Some(thread),
            owner: std::process::id(),
        })
    }

    pub fn track(&self, pid: libc::pid_t) {
        lock(&self.jobs).push(pid);
        // The child may have exited before it was registered.
        reap_jobs(&self.jobs);
    }

    /// Non-blocking sweep over the tracked children.
    pub fn reap(&self) -> Vec<libc::pid_t> {
        reap_jobs(&self.jobs)
    }

    pub fn pending(&self) -> usize {
        lock(&self.jobs).len()
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        if std::process::id() == self.owner {
            self.handle.close();
            if thread.join().is_err() {
                tracing::warn!("reaper thread panicked");
            }
        } else {
            // A forked child has no reaper thread to join.
            std::mem::forget(thread);
        }
    }
}

fn lock(jobs: &Mutex<Vec<libc::pid_t>>) -> MutexGuard<'_, Vec<libc::pid_t>> {
    jobs.lock().unwrap_or_else(PoisonError::into_inner)
}

fn reap_jobs(jobs: &Mutex<Vec<libc::pid_t>>) -> Vec<libc::pid_t> {
    let mut jobs = lock(jobs);
    let mut reaped = Vec::new();

    jobs.retain(|&pid| {
        // SAFETY: a null status pointer is allowed by waitpid.
        let rc = unsafe { libc::waitpid(pid, std::ptr::null_mut(), libc::WNOHANG) };
        if rc == 0 {
            return true;
        }
        // rc == -1 means the pid is no longer ours to wait on; drop it too.
        reaped.push(pid);
        false
    });

    for pid in &reaped {
        tracing::debug!(pid, "reaped background child");
    }
    reaped
}
