use super::Session;
use crate::core::commands::{self, history, Builtin, CdCommand, CommandError};
use crate::core::tokenizer::{tokenize, Tokens};
use crate::format::Printer;
use crate::process::{Launched, Launcher};

/// Exit status of a forked child that could not replace its image.
pub const EXEC_FAILURE_STATUS: i32 = 1;

/// Nested replays allowed before a replay is refused.
pub const MAX_REPLAY_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// This process is a child whose exec failed; it must unwind and exit.
    ExitChild,
}

pub struct Dispatcher<L> {
    launcher: L,
    cd: CdCommand,
}

impl<L: Launcher> Dispatcher<L> {
    pub fn new(launcher: L) -> Self {
        Dispatcher {
            launcher,
            cd: CdCommand::new(),
        }
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn launcher_mut(&mut self) -> &mut L {
        &mut self.launcher
    }

    /// Runs one line. Blank lines are ignored and leave no history.
    pub fn dispatch(
        &mut self,
        session: &mut Session,
        printer: &mut Printer,
        line: String,
    ) -> Result<Flow, CommandError> {
        self.dispatch_at(session, printer, line, 0)
    }

    fn dispatch_at(
        &mut self,
        session: &mut Session,
        printer: &mut Printer,
        mut line: String,
        depth: usize,
    ) -> Result<Flow, CommandError> {
        let tokens = tokenize(&mut line);
        if tokens.is_empty() {
            return Ok(Flow::Continue);
        }

        let builtin = commands::classify(&tokens.args);
        tracing::debug!(?builtin, depth, background = tokens.background, "dispatch");

        if builtin.is_logged() {
            session.history.append(line);
        }

        match builtin {
            Builtin::Cd(dir) => self.cd.execute(dir).map(|()| Flow::Continue),
            Builtin::Exit => {
                session.quit()?;
                Ok(Flow::Continue)
            }
            Builtin::ListHistory => {
                history::list(&session.history, printer);
                Ok(Flow::Continue)
            }
            Builtin::ReplayIndex(token) => {
                let index = history::parse_index(token, session.history.len())?;
                self.replay(session, printer, index, tokens.args, depth)
            }
            Builtin::ReplayMatch(needle) => {
                let index =
                    history::find_match(&session.history, needle).ok_or(CommandError::NoMatch)?;
                self.replay(session, printer, index, tokens.args, depth)
            }
            Builtin::External => self.launch(session, tokens),
        }
    }

    fn replay(
        &mut self,
        session: &mut Session,
        printer: &mut Printer,
        index: usize,
        args: Vec<String>,
        depth: usize,
    ) -> Result<Flow, CommandError> {
        if depth >= MAX_REPLAY_DEPTH {
            return Err(CommandError::ReplayDepthExceeded(MAX_REPLAY_DEPTH));
        }

        let command = session
            .history
            .get(index)
            .map(str::to_string)
            .ok_or(CommandError::InvalidIndex)?;

        printer.line(&command);
        tracing::debug!(index, depth, %command, "replaying history entry");

        session.post_replay(args);
        self.dispatch_at(session, printer, command, depth + 1)
    }

    fn launch(&mut self, session: &mut Session, tokens: Tokens) -> Result<Flow, CommandError> {
        let launched = self.launcher.launch(&tokens.args, tokens.background);

        if matches!(launched, Ok(Launched::ExecFailed)) {
            return Ok(Flow::ExitChild);
        }
        session.take_replay();

        // Only the child's own exec-failure status is reported. A program that
        // exits 1 by itself looks the same from here; other statuses are its own.
        match launched? {
            Launched::Finished {
                code: Some(EXEC_FAILURE_STATUS),
                ..
            } => {
                let program = tokens.program().unwrap_or_default().to_string();
                Err(CommandError::ExecFailed(program))
            }
            _ => Ok(Flow::Continue),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::format::testing::SharedBuf;
    use crate::process::ProcessError;

    /// Records launch requests instead of forking.
    #[derive(Default)]
    pub(crate) struct RecordingLauncher {
        pub launches: Vec<(Vec<String>, bool)>,
        pub exit_code: i32,
        pub fail_exec: bool,
        pub fail_fork: bool,
    }

    impl Launcher for RecordingLauncher {
        fn launch(&mut self, args: &[String], background: bool) -> Result<Launched, ProcessError> {
            if self.fail_fork {
                return Err(ProcessError::ForkFailed(std::io::Error::from_raw_os_error(
                    libc::EAGAIN,
                )));
            }
            self.launches.push((args.to_vec(), background));
            if self.fail_exec {
                Ok(Launched::ExecFailed)
            } else if background {
                Ok(Launched::Background { pid: 4242 })
            } else {
                Ok(Launched::Finished {
                    pid: 4242,
                    code: Some(self.exit_code),
                })
            }
        }
    }

    struct Fixture {
        dispatcher: Dispatcher<RecordingLauncher>,
        session: Session,
        printer: Printer,
        out: SharedBuf,
    }

    impl Fixture {
        fn with_history(entries: &[&str]) -> Self {
            let out = SharedBuf::default();
            Fixture {
                dispatcher: Dispatcher::new(RecordingLauncher::default()),
                session: Session::new(entries.iter().copied().collect(), None),
                printer: Printer::new(Box::new(out.clone())),
                out,
            }
        }

        fn run(&mut self, line: &str) -> Result<Flow, CommandError> {
            self.dispatcher
                .dispatch(&mut self.session, &mut self.printer, line.to_string())
        }

        fn launches(&self) -> Vec<(Vec<&str>, bool)> {
            self.dispatcher
                .launcher()
                .launches
                .iter()
                .map(|(args, bg)| (args.iter().map(String::as_str).collect(), *bg))
                .collect()
        }

        fn history(&self) -> Vec<&str> {
            self.session.history.iter().collect()
        }
    }

    #[test]
    fn test_external_command_is_launched_and_logged() {
        let mut fx = Fixture::with_history(&[]);
        assert_eq!(fx.run("echo hi").unwrap(), Flow::Continue);
        assert_eq!(fx.launches(), vec![(vec!["echo", "hi"], false)]);
        assert_eq!(fx.history(), vec!["echo hi"]);
    }

    #[test]
    fn test_blank_line_does_nothing() {
        let mut fx = Fixture::with_history(&[]);
        fx.run("").unwrap();
        fx.run("    ").unwrap();
        assert!(fx.launches().is_empty());
        assert!(fx.history().is_empty());
    }

    #[test]
    fn test_background_is_not_waited_and_marker_is_dropped_from_history() {
        let mut fx = Fixture::with_history(&[]);
        fx.run("sleep 10 &").unwrap();
        assert_eq!(fx.launches(), vec![(vec!["sleep", "10"], true)]);
        assert_eq!(fx.history(), vec!["sleep 10  "]);
    }

    #[test]
    fn test_replay_by_index() {
        let mut fx = Fixture::with_history(&["ls -l", "echo hi"]);
        fx.run("#1").unwrap();
        assert_eq!(fx.launches(), vec![(vec!["echo", "hi"], false)]);
        assert_eq!(fx.history(), vec!["ls -l", "echo hi", "echo hi"]);
        assert_eq!(fx.out.contents(), "echo hi\n");
        assert!(!fx.session.has_pending_replay());
    }

    #[test]
    fn test_replay_invalid_index() {
        let mut fx = Fixture::with_history(&["ls -l", "echo hi"]);
        for token in ["#5", "#-1", "#1x", "#"] {
            assert!(matches!(fx.run(token), Err(CommandError::InvalidIndex)));
        }
        assert!(fx.launches().is_empty());
        assert_eq!(fx.history(), vec!["ls -l", "echo hi"]);
    }

    #[test]
    fn test_replay_by_substring() {
        let mut fx = Fixture::with_history(&["ls -l"]);
        fx.run("!ls").unwrap();
        assert_eq!(fx.launches(), vec![(vec!["ls", "-l"], false)]);

        let mut fx = Fixture::with_history(&["ls -l", "echo hi", "echo hi there"]);
        fx.run("!hi").unwrap();
        assert_eq!(fx.launches(), vec![(vec!["echo", "hi"], false)]);
        assert_eq!(fx.out.contents(), "echo hi\n");
    }

    #[test]
    fn test_replay_no_match() {
        let mut fx = Fixture::with_history(&["ls -l"]);
        assert!(matches!(fx.run("!grep"), Err(CommandError::NoMatch)));
        assert!(fx.launches().is_empty());
        assert_eq!(fx.history(), vec!["ls -l"]);
    }

    #[test]
    fn test_replay_of_builtin_follows_its_logging_rule() {
        let mut fx = Fixture::with_history(&["!history"]);
        fx.run("#0").unwrap();
        assert_eq!(fx.history(), vec!["!history"]);
        assert_eq!(fx.out.contents(), "!history\n0\t!history\n");
        // The replay vector is only claimed by a launch.
        assert!(fx.session.has_pending_replay());
    }

    #[test]
    fn test_self_referencing_replay_is_capped() {
        let mut fx = Fixture::with_history(&["#0"]);
        assert!(matches!(
            fx.run("#0"),
            Err(CommandError::ReplayDepthExceeded(MAX_REPLAY_DEPTH))
        ));
        assert!(fx.launches().is_empty());
        assert_eq!(fx.out.contents().lines().count(), MAX_REPLAY_DEPTH);
    }

    #[test]
    fn test_chained_replay_within_limit() {
        let mut fx = Fixture::with_history(&["echo deep", "#0", "!#0"]);
        fx.run("#2").unwrap();
        assert_eq!(fx.launches(), vec![(vec!["echo", "deep"], false)]);
        assert_eq!(fx.out.contents(), "!#0\n#0\necho deep\n");
    }

    #[test]
    fn test_list_history_is_not_logged() {
        let mut fx = Fixture::with_history(&["ls"]);
        fx.run("!history").unwrap();
        assert_eq!(fx.history(), vec!["ls"]);
        assert_eq!(fx.out.contents(), "0\tls\n");
    }

    #[test]
    fn test_cd_failure_is_still_logged() {
        let mut fx = Fixture::with_history(&[]);
        let result = fx.run("cd /nonexistent");
        assert!(matches!(result, Err(CommandError::NoSuchDirectory(_))));
        assert_eq!(fx.history(), vec!["cd /nonexistent"]);
        assert!(fx.launches().is_empty());
    }

    #[test]
    fn test_exit_is_logged_and_stops_session() {
        let mut fx = Fixture::with_history(&[]);
        fx.run("exit").unwrap();
        assert!(!fx.session.is_running());
        assert_eq!(fx.history(), vec!["exit"]);
    }

    #[test]
    fn test_exec_failure_status_reports_program() {
        let mut fx = Fixture::with_history(&[]);
        fx.dispatcher.launcher_mut().exit_code = 1;
        assert!(matches!(
            fx.run("lss -a"),
            Err(CommandError::ExecFailed(program)) if program == "lss"
        ));
        assert_eq!(fx.history(), vec!["lss -a"]);
    }

    #[test]
    fn test_other_exit_statuses_are_not_reported() {
        let mut fx = Fixture::with_history(&[]);
        fx.dispatcher.launcher_mut().exit_code = 2;
        assert_eq!(fx.run("ls /nonexistent").unwrap(), Flow::Continue);
        assert_eq!(fx.history(), vec!["ls /nonexistent"]);
    }

    #[test]
    fn test_exec_failure_in_child_unwinds() {
        let mut fx = Fixture::with_history(&["nosuchprogram"]);
        fx.dispatcher.launcher_mut().fail_exec = true;
        assert_eq!(fx.run("#0").unwrap(), Flow::ExitChild);
        // The child still owns the replay vector; it goes when the session drops.
        assert!(fx.session.has_pending_replay());
    }

    #[test]
    fn test_fork_failure_is_reported() {
        let mut fx = Fixture::with_history(&[]);
        fx.dispatcher.launcher_mut().fail_fork = true;
        assert!(matches!(
            fx.run("echo hi"),
            Err(CommandError::Process(ProcessError::ForkFailed(_)))
        ));
        assert!(fx.session.is_running());
    }

    #[test]
    fn test_history_grows_one_per_loggable_command() {
        let mut fx = Fixture::with_history(&[]);
        for line in ["echo a", "!history", "echo b", "#0", "!zzz", "cd /nonexistent"] {
            let _ = fx.run(line);
        }
        assert_eq!(
            fx.history(),
            vec!["echo a", "echo b", "echo a", "cd /nonexistent"]
        );
    }
}
