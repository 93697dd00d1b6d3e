//! Check command - report connectivity and optional tools.

use console::style;
use tracing::{debug, info};

use specify::template::check_connectivity;
use specify::template::release::CONNECTIVITY_TIMEOUT;
use specify::tools::{self, PathToolChecker};

use super::probe_tool;
use crate::error::CliError;
use crate::runner::CliRunner;
use crate::ui;

/// Run the check command. Missing pieces are reported, never fatal.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    ui::print_banner();
    println!("{}", style("Checking Specify requirements...").bold());
    println!();

    let api_base = &runner.config().release.api_base;
    println!("{}", style("Checking internet connectivity...").cyan());
    match check_connectivity(api_base, CONNECTIVITY_TIMEOUT) {
        Ok(()) => println!("{} Internet connection available", style("✓").green()),
        Err(e) => {
            debug!(error = %e, "Connectivity check failed");
            println!(
                "{} No internet connection - required for downloading templates",
                style("✗").red()
            );
            println!("{}", style("Please check your network settings").yellow());
        }
    }

    let checker = PathToolChecker::new();

    println!();
    println!("{}", style("Optional tools:").cyan());
    let git_ok = report_tool(&checker, tools::GIT);

    println!();
    println!("{}", style("Optional AI tools:").cyan());
    let claude_ok = report_tool(&checker, tools::CLAUDE);
    let gemini_ok = report_tool(&checker, tools::GEMINI);

    info!(git_ok, claude_ok, gemini_ok, "Requirements checked");

    println!();
    println!("{}", style("✓ Specify CLI is ready to use!").green().bold());
    if !git_ok {
        println!("{}", style("Consider installing git for repository management").yellow());
    }
    if !(claude_ok || gemini_ok) {
        println!("{}", style("Consider installing an AI assistant for the best experience").yellow());
    }
    Ok(())
}

fn report_tool(checker: &PathToolChecker, requirement: tools::ToolRequirement) -> bool {
    let found = probe_tool(checker, requirement);
    if found {
        println!("{} {} found", style("✓").green(), requirement.tool);
    }
    found
}
