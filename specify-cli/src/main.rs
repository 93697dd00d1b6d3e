//! Specify CLI - Command-line interface
//!
//! Bootstraps Spec-Driven Development projects from the latest published
//! template release.

mod commands;
mod error;
mod runner;
mod ui;

use std::process;

use clap::{Parser, Subcommand};

use commands::init::InitArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "specify")]
#[command(version, about = "Setup tool for Specify spec-driven development projects")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Initialize a new Specify project from the latest template
    Init(InitArgs),

    /// Check that required tools are installed
    Check,
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Some(command) = cli.command else {
        ui::print_banner();
        ui::print_usage_hint();
        return Ok(());
    };

    let runner = CliRunner::new();
    match command {
        Commands::Init(args) => {
            runner.log_startup("init");
            commands::init::run(args, &runner)
        }
        Commands::Check => {
            runner.log_startup("check");
            commands::check::run(&runner)
        }
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        e.report();
        process::exit(e.exit_code());
    }
}
