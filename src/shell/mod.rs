use std::env;

mod dispatch;
mod session;

pub use dispatch::{Dispatcher, Flow, EXEC_FAILURE_STATUS, MAX_REPLAY_DEPTH};
pub use session::Session;

use crate::{
    config::Config,
    error::ShellError,
    format::{self, Printer},
    input::{History, LineSource, ReadOutcome},
    process::{signal, Launcher, ProcessExecutor},
};

/// How the read loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// `exit`, or end of input.
    Quit,
    /// This is a forked child whose program could not be executed.
    ChildExecFailed,
}

pub struct Shell<L: Launcher = ProcessExecutor> {
    session: Session,
    source: LineSource,
    printer: Printer,
    dispatcher: Dispatcher<L>,
}

impl Shell {
    /// Loads history, opens the script, and installs signal handling.
    /// Every failure here is fatal.
    pub fn new(config: &Config) -> Result<Self, ShellError> {
        signal::ignore_interrupts()?;

        let history = match &config.history_file {
            Some(path) => History::load(path)?,
            None => History::new(),
        };
        let source = match &config.script_file {
            Some(path) => LineSource::script(path)?,
            None => LineSource::interactive()?,
        };

        Ok(Shell::with_parts(
            Session::new(history, config.history_file.clone()),
            source,
            Printer::stdout(config.quiet),
            Dispatcher::new(ProcessExecutor::new()?),
        ))
    }
}

impl<L: Launcher> Shell<L> {
    pub fn with_parts(
        session: Session,
        source: LineSource,
        printer: Printer,
        dispatcher: Dispatcher<L>,
    ) -> Self {
        Shell {
            session,
            source,
            printer,
            dispatcher,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn run(&mut self) -> Result<Exit, ShellError> {
        while self.session.is_running() {
            self.dispatcher.launcher_mut().reap_finished();

            let dir = current_dir_display();
            let pid = std::process::id();
            let prompt = format::prompt(&dir, pid);
            if self.source.is_script() {
                self.printer.prompt(&dir, pid);
            }

            let outcome = match self.source.read_line(&prompt) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.printer.error(&e);
                    ReadOutcome::Eof
                }
            };

            match outcome {
                ReadOutcome::Line(line) => {
                    if self.source.is_script() {
                        self.printer.line(&line);
                    }
                    match self
                        .dispatcher
                        .dispatch(&mut self.session, &mut self.printer, line)
                    {
                        Ok(Flow::Continue) => {}
                        Ok(Flow::ExitChild) => return Ok(Exit::ChildExecFailed),
                        Err(e) => self.printer.error(&e),
                    }
                }
                ReadOutcome::Interrupted => {}
                ReadOutcome::Eof => self.end_of_input(),
            }
            self.printer.flush();
        }
        Ok(Exit::Quit)
    }

    /// Out of input: behave like `exit`, without logging it.
    fn end_of_input(&mut self) {
        self.printer.line("exit");
        if let Err(e) = self.session.quit() {
            self.printer.error(&e);
        }
    }
}

fn current_dir_display() -> String {
    match env::current_dir() {
        Ok(dir) => dir.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!("cannot read working directory: {}", e);
            String::from("?")
        }
    }
}
