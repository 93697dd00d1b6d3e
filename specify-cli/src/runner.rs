//! Shared command setup: configuration, logging and report mode.

use std::path::{Path, PathBuf};

use console::style;
use tracing::info;

use specify::config::ConfigFile;
use specify::logging::init_logging;
use specify::template::ReportMode;

/// Per-invocation context shared by all commands.
#[derive(Debug)]
pub struct CliRunner {
    config: ConfigFile,
    log_file: Option<PathBuf>,
}

impl CliRunner {
    /// Load configuration and start file logging.
    ///
    /// Neither step is fatal: a broken config file falls back to defaults
    /// and a log directory that cannot be created disables logging.
    pub fn new() -> Self {
        let config = ConfigFile::load().unwrap_or_else(|e| {
            eprintln!("{} {}", style("Warning:").yellow(), e);
            ConfigFile::default()
        });

        let log_file = match init_logging(&config.logging.directory) {
            Ok(path) => Some(path),
            Err(e) => {
                eprintln!("{} logging disabled: {}", style("Warning:").yellow(), e);
                None
            }
        };

        Self { config, log_file }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Record the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            command,
            api_base = %self.config.release.api_base,
            "Specify starting"
        );
    }

    /// Live tree on a terminal, line output otherwise.
    pub fn report_mode(&self) -> ReportMode {
        if atty::is(atty::Stream::Stdout) {
            ReportMode::Structured
        } else {
            ReportMode::Verbose
        }
    }
}
