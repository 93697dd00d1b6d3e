//! Seams between the pipeline and its collaborators.
//!
//! The installer depends only on these traits so tests can substitute
//! in-memory implementations for the network and for git.

use std::path::{Path, PathBuf};

use super::error::TemplateResult;
use super::release::{Release, ReleaseMetadata};

/// Byte-level download progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadProgress {
    /// Total size is known.
    Determinate { written: u64, total: u64 },
    /// Transport exposed no size; only a running counter is available.
    Indeterminate { written: u64 },
}

impl DownloadProgress {
    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        match *self {
            Self::Determinate { written, .. } | Self::Indeterminate { written } => written,
        }
    }

    /// Completed fraction in `[0, 1]`, `None` when the total is unknown.
    pub fn fraction(&self) -> Option<f64> {
        match *self {
            Self::Determinate { written, total } if total > 0 => {
                Some((written as f64 / total as f64).min(1.0))
            }
            Self::Determinate { .. } => Some(1.0),
            Self::Indeterminate { .. } => None,
        }
    }
}

/// Source of release metadata.
pub trait ReleaseClient {
    /// Fetch the latest release descriptor.
    fn fetch_latest_release(&self) -> TemplateResult<Release>;
}

/// Fetches a release asset to local storage.
pub trait TemplateDownloader {
    /// Download the asset described by `metadata` into `dest_dir`.
    ///
    /// Returns the path of the written archive. On failure no partial file
    /// is left behind.
    fn download(
        &self,
        metadata: &ReleaseMetadata,
        dest_dir: &Path,
        on_progress: &mut dyn FnMut(DownloadProgress),
    ) -> TemplateResult<PathBuf>;
}

/// Archive extraction backend.
pub trait ArchiveExtractor {
    /// Extract `archive_path` into `dest_dir`, returning the number of files
    /// written.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> TemplateResult<usize>;

    /// List entry names without extracting.
    fn list_contents(&self, archive_path: &Path) -> TemplateResult<Vec<String>>;
}

/// Initializes version control in a deployed project.
pub trait VersionControlInitializer {
    /// Whether `path` is already inside a repository work tree.
    fn is_repository(&self, path: &Path) -> bool;

    /// Create a repository at `path` and commit its contents.
    fn initialize(&self, path: &Path) -> TemplateResult<()>;
}

/// Probes for external tools.
pub trait ToolAvailabilityChecker {
    /// Whether `tool` can be executed.
    fn is_available(&self, tool: &str) -> bool;
}
