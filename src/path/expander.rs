use crate::error::ShellError;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct PathExpander;

impl PathExpander {
    pub fn new() -> Self {
        Self
    }

    /// Expands a leading `~` or `~/` to the home directory. Other paths,
    /// including `~user`, pass through untouched.
    pub fn expand(&self, path: &str) -> Result<PathBuf, ShellError> {
        match path.strip_prefix('~') {
            Some("") => self.home_dir(),
            Some(rest) if rest.starts_with('/') => {
                let mut home = self.home_dir()?;
                for part in rest.split('/').filter(|p| !p.is_empty()) {
                    home.push(part);
                }
                Ok(home)
            }
            _ => Ok(Path::new(path).to_path_buf()),
        }
    }

    /// Like [`expand`](Self::expand), then anchors relative results at the
    /// current working directory so the path survives a later `cd`.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, ShellError> {
        let expanded = self.expand(path)?;
        if expanded.is_absolute() {
            Ok(expanded)
        } else {
            Ok(env::current_dir()?.join(expanded))
        }
    }

    fn home_dir(&self) -> Result<PathBuf, ShellError> {
        dirs::home_dir().ok_or(ShellError::HomeDirNotFound)
    }
}
