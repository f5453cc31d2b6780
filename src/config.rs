use std::path::PathBuf;

use thiserror::Error;

use crate::error::ShellError;
use crate::flags::Flags;
use crate::path::PathExpander;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Empty path given to {0}")]
    EmptyPath(&'static str),

    #[error("Cannot resolve {path}: {reason}")]
    Unresolvable { path: String, reason: String },
}

/// Startup mode, derived once from the command line.
///
/// The four accepted combinations are: nothing (fresh history, interactive),
/// `-h` alone, `-f` alone, or both. Everything else has already been rejected
/// by [`Flags::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub history_file: Option<PathBuf>,
    pub script_file: Option<PathBuf>,
    pub debug: bool,
    pub quiet: bool,
}

impl Config {
    pub fn from_flags(flags: &Flags) -> Result<Self, ConfigError> {
        let expander = PathExpander::new();

        Ok(Config {
            history_file: resolve(&expander, flags.get_value("history"), "--history")?,
            script_file: resolve(&expander, flags.get_value("file"), "--file")?,
            debug: flags.is_set("debug"),
            quiet: flags.is_set("quiet"),
        })
    }

    pub fn is_interactive(&self) -> bool {
        self.script_file.is_none()
    }
}

fn resolve(
    expander: &PathExpander,
    value: Option<&String>,
    flag: &'static str,
) -> Result<Option<PathBuf>, ConfigError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Err(ConfigError::EmptyPath(flag));
    }

    expander
        .resolve(raw)
        .map(Some)
        .map_err(|e: ShellError| ConfigError::Unresolvable {
            path: raw.clone(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(list: &[&str]) -> Result<Config, ConfigError> {
        let mut flags = Flags::new();
        let args: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        flags.parse(&args).unwrap();
        Config::from_flags(&flags)
    }

    #[test]
    fn test_default_mode() {
        let config = config_for(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.is_interactive());
    }

    #[test]
    fn test_paths_are_absolute() {
        let config = config_for(&["-h", "hist.txt", "-f", "/tmp/script.txt"]).unwrap();
        let history = config.history_file.unwrap();
        assert!(history.is_absolute());
        assert!(history.ends_with("hist.txt"));
        assert_eq!(config.script_file.unwrap(), PathBuf::from("/tmp/script.txt"));
    }

    #[test]
    fn test_script_mode_not_interactive() {
        let config = config_for(&["-f", "script.txt"]).unwrap();
        assert!(!config.is_interactive());
        assert!(config.history_file.is_none());
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(
            config_for(&["-h", ""]),
            Err(ConfigError::EmptyPath("--history"))
        ));
    }
}
