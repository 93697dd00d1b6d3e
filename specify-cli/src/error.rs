//! CLI error type and reporting.

use console::style;
use thiserror::Error;

use specify::config::ConfigError;
use specify::selector::MenuError;
use specify::template::TemplateError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Validation(String),

    /// The user declined a prompt or pressed Escape in the selector.
    #[error("operation cancelled")]
    Cancelled,

    /// Ctrl-C outside the pipeline.
    #[error("interrupted")]
    Interrupted,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<MenuError> for CliError {
    fn from(e: MenuError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl CliError {
    /// Process exit code. Every fatal condition exits with 1.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Whether this error is a user-initiated stop rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Interrupted | Self::Template(TemplateError::Interrupted)
        )
    }

    /// Print the error to stderr.
    pub fn report(&self) {
        if self.is_cancellation() {
            eprintln!("{}", style(capitalize(&self.to_string())).yellow());
        } else {
            eprintln!("{} {}", style("Error:").red().bold(), self);
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_is_one_for_everything() {
        assert_eq!(CliError::Cancelled.exit_code(), 1);
        assert_eq!(CliError::Validation("x".into()).exit_code(), 1);
        assert_eq!(
            CliError::Template(TemplateError::network("u", "r")).exit_code(),
            1
        );
    }

    #[test]
    fn test_cancellation_classification() {
        assert!(CliError::Cancelled.is_cancellation());
        assert!(CliError::Template(TemplateError::Interrupted).is_cancellation());
        assert!(!CliError::Validation("bad".into()).is_cancellation());
    }

    #[test]
    fn test_template_error_is_transparent() {
        let err = CliError::from(TemplateError::Validation("both given".into()));
        assert_eq!(err.to_string(), "both given");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("operation cancelled"), "Operation cancelled");
        assert_eq!(capitalize(""), "");
    }
}
