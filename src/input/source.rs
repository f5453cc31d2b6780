use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::ShellError;

#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C at an interactive prompt.
    Interrupted,
    Eof,
}

/// Where command lines come from: the terminal, or an open script file.
pub enum LineSource {
    Interactive(DefaultEditor),
    Script(Box<dyn BufRead>),
}

impl LineSource {
    pub fn interactive() -> Result<Self, ShellError> {
        let mut editor = DefaultEditor::new()?;
        editor.set_auto_add_history(false);
        Ok(LineSource::Interactive(editor))
    }

    pub fn script(path: &Path) -> Result<Self, ShellError> {
        let file = File::open(path).map_err(ShellError::ScriptFile)?;
        tracing::debug!(path = %path.display(), "reading commands from script");
        Ok(LineSource::Script(Box::new(BufReader::new(file))))
    }

    pub fn from_reader(reader: impl BufRead + 'static) -> Self {
        LineSource::Script(Box::new(reader))
    }

    pub fn is_script(&self) -> bool {
        matches!(self, LineSource::Script(_))
    }

    /// Reads one line without its terminator. `prompt` is only rendered here
    /// for interactive input; script callers print their own.
    pub fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError> {
        match self {
            LineSource::Interactive(editor) => match editor.readline(prompt) {
                Ok(line) => {
                    if let Err(e) = editor.add_history_entry(line.as_str()) {
                        tracing::warn!("couldn't add to line editor history: {}", e);
                    }
                    Ok(ReadOutcome::Line(line))
                }
                Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
                Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
                Err(e) => Err(e.into()),
            },
            LineSource::Script(reader) => {
                let mut buf = Vec::new();
                if reader.read_until(b'\n', &mut buf)? == 0 {
                    return Ok(ReadOutcome::Eof);
                }
                // Bytes that are not UTF-8 are replaced, not rejected.
                let mut line = String::from_utf8_lossy(&buf).into_owned();
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Ok(ReadOutcome::Line(line))
            }
        }
    }
}
