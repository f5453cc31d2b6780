use super::CommandError;
use crate::path::PathExpander;
use std::env;

#[derive(Debug, Clone, Default)]
pub struct CdCommand {
    path_expander: PathExpander,
}

impl CdCommand {
    pub fn new() -> Self {
        Self {
            path_expander: PathExpander::new(),
        }
    }

    /// Leaves the working directory untouched on failure.
    pub fn execute(&self, dir: &str) -> Result<(), CommandError> {
        let target = self
            .path_expander
            .expand(dir)
            .map_err(|_| CommandError::NoSuchDirectory(dir.to_string()))?;

        env::set_current_dir(&target).map_err(|e| {
            tracing::debug!(dir, error = %e, "chdir failed");
            CommandError::NoSuchDirectory(dir.to_string())
        })
    }
}
