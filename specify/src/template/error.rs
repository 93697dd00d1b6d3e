//! Error types for the template pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while acquiring and deploying a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Conflicting or missing arguments, detected before any I/O.
    #[error("{0}")]
    Validation(String),

    /// Transport failure reaching the release endpoint or an asset.
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    /// The release has no asset for the requested variant.
    #[error(
        "no template found for variant '{variant}' in release {release}; available assets: {}",
        format_asset_names(.available)
    )]
    NoMatchingAsset {
        variant: String,
        release: String,
        available: Vec<String>,
    },

    /// Failed to write the downloaded archive locally.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Archive corrupt, unsupported structure, or filesystem failure while
    /// reconciling the extracted tree.
    #[error("failed to extract {}: {reason}", .path.display())]
    Extraction { path: PathBuf, reason: String },

    /// Repository initialization failed.
    #[error("git initialization failed: {0}")]
    VersionControl(String),

    /// An interrupt arrived while the pipeline was running.
    #[error("interrupted")]
    Interrupted,
}

impl TemplateError {
    /// Build an extraction error from any displayable cause.
    pub fn extraction(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Extraction {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a network error from any displayable cause.
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

fn format_asset_names(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}
