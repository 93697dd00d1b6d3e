//! External tool probes.

use tracing::debug;

use crate::template::traits::ToolAvailabilityChecker;

/// An executable a feature depends on, with where to get it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolRequirement {
    pub tool: &'static str,
    pub install_hint: &'static str,
}

pub const GIT: ToolRequirement = ToolRequirement {
    tool: "git",
    install_hint: "https://git-scm.com/downloads",
};

pub const CLAUDE: ToolRequirement = ToolRequirement {
    tool: "claude",
    install_hint: "https://docs.anthropic.com/en/docs/claude-code/setup",
};

pub const GEMINI: ToolRequirement = ToolRequirement {
    tool: "gemini",
    install_hint: "https://github.com/google-gemini/gemini-cli",
};

/// Checks tools by searching `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathToolChecker;

impl PathToolChecker {
    pub fn new() -> Self {
        Self
    }
}

impl ToolAvailabilityChecker for PathToolChecker {
    fn is_available(&self, tool: &str) -> bool {
        let found = which::which(tool).is_ok();
        debug!(tool, found, "Probed tool");
        found
    }
}
