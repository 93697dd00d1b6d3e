//! Git repository initialization.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::template::error::{TemplateError, TemplateResult};
use crate::template::traits::VersionControlInitializer;

/// Message of the first commit in a new project.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from Specify template";

/// Runs the `git` executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitInitializer;

impl GitInitializer {
    pub fn new() -> Self {
        Self
    }

    fn run(&self, path: &Path, args: &[&str]) -> TemplateResult<String> {
        debug!(path = %path.display(), ?args, "Running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(path)
            .output()
            .map_err(|e| TemplateError::VersionControl(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TemplateError::VersionControl(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or_default(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl VersionControlInitializer for GitInitializer {
    fn is_repository(&self, path: &Path) -> bool {
        if !path.is_dir() {
            return false;
        }
        self.run(path, &["rev-parse", "--is-inside-work-tree"])
            .map(|out| out.trim() == "true")
            .unwrap_or(false)
    }

    fn initialize(&self, path: &Path) -> TemplateResult<()> {
        self.run(path, &["init"])?;
        self.run(path, &["add", "."])?;
        self.run(path, &["commit", "-m", INITIAL_COMMIT_MESSAGE])?;
        Ok(())
    }
}
