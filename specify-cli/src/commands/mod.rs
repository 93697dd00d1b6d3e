//! Subcommand implementations.

pub mod check;
pub mod init;

use console::style;

use specify::template::ToolAvailabilityChecker;
use specify::tools::ToolRequirement;

/// Probe a tool, printing where to get it when missing.
pub(crate) fn probe_tool(checker: &impl ToolAvailabilityChecker, requirement: ToolRequirement) -> bool {
    if checker.is_available(requirement.tool) {
        return true;
    }
    println!("{}", style(format!("⚠️  {} not found", requirement.tool)).yellow());
    println!("   Install with: {}", style(requirement.install_hint).cyan());
    false
}
