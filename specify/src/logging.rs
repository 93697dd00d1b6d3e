//! File-based tracing setup.
//!
//! Log output goes to `{directory}/specify.log` rather than the terminal so
//! the live step tree is never interleaved with log lines. The filter is
//! read from `SPECIFY_LOG` and defaults to `info`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "SPECIFY_LOG";

/// Log file name prefix and suffix.
const LOG_FILE_PREFIX: &str = "specify";
const LOG_FILE_SUFFIX: &str = "log";

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

/// Errors setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open log file in {}: {reason}", .path.display())]
    Appender { path: PathBuf, reason: String },
}

/// Install the global file subscriber.
///
/// Returns the log file path. Calling this more than once returns the path
/// from the first call.
pub fn init_logging(directory: &Path) -> Result<PathBuf, LoggingError> {
    if let Some(path) = LOG_FILE.get() {
        return Ok(path.clone());
    }

    fs::create_dir_all(directory).map_err(|e| LoggingError::CreateDir {
        path: directory.to_path_buf(),
        source: e,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(directory)
        .map_err(|e| LoggingError::Appender {
            path: directory.to_path_buf(),
            reason: e.to_string(),
        })?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::new(Rfc3339))
        .with_writer(appender)
        .with_ansi(false)
        .with_target(true)
        .try_init();

    let path = log_file_path(directory);
    Ok(LOG_FILE.get_or_init(|| path).clone())
}

/// Log file location inside `directory`.
pub fn log_file_path(directory: &Path) -> PathBuf {
    directory.join(format!("{}.{}", LOG_FILE_PREFIX, LOG_FILE_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_path() {
        assert_eq!(
            log_file_path(Path::new("/var/log/specify")),
            PathBuf::from("/var/log/specify/specify.log")
        );
    }

    #[test]
    fn test_init_logging_creates_directory_and_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("logs");

        let first = init_logging(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(first, log_file_path(&dir));

        let second = init_logging(&temp.path().join("other")).unwrap();
        assert_eq!(first, second);
    }
}
