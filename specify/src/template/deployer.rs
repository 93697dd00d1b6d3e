//! Archive deployment into a project directory.
//!
//! The archive is always extracted into a private scratch directory first and
//! then reconciled into the target:
//!
//! - **Fresh**: the target is created by this run. The scratch directory sits
//!   next to the target so children can be renamed into place. On failure the
//!   target is removed again.
//! - **Merge in place**: the target already exists. Archive files are copied
//!   over the existing tree and win on conflicts. On failure only scratch
//!   artifacts are removed, never user content.
//!
//! An archive whose only top-level entry is a directory is flattened: that
//! directory's children are deployed instead of the directory itself.
//!
//! The source archive is deleted on every exit path.

use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::error::{TemplateError, TemplateResult};
use super::steps;
use super::traits::ArchiveExtractor;
use crate::progress::ProgressTracker;

/// Prefix of scratch directories created next to a fresh target.
const FRESH_SCRATCH_PREFIX: &str = ".specify-extract-";

/// Prefix of scratch directories created in the system temp dir for merges.
const MERGE_SCRATCH_PREFIX: &str = "specify-extract-";

/// How the target directory is reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode {
    /// Target is created by this run and rolled back entirely on failure.
    Fresh,
    /// Target pre-exists; archive contents are merged into it.
    MergeInPlace,
}

/// Where and how to deploy an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub root_path: PathBuf,
    pub mode: DeployMode,
}

impl DeploymentTarget {
    pub fn fresh(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            mode: DeployMode::Fresh,
        }
    }

    pub fn merge_in_place(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            mode: DeployMode::MergeInPlace,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.mode == DeployMode::Fresh
    }
}

/// Summary of a successful deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    /// Entries listed in the archive, directories included.
    pub entries: usize,
    /// Files written during extraction.
    pub files_extracted: usize,
    /// Items at the scratch top level.
    pub top_level_items: usize,
    /// Whether a single wrapper directory was stripped.
    pub flattened: bool,
    /// Whether the archive was deleted by this deployment.
    pub archive_removed: bool,
}

/// Archive path owned for the duration of a deployment.
///
/// Deleted by [`ScopedArchive::release`], or on drop if release never ran.
#[derive(Debug)]
struct ScopedArchive {
    path: PathBuf,
    released: bool,
}

impl ScopedArchive {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            released: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the archive. `Ok(false)` when it was already gone.
    fn release(&mut self) -> io::Result<bool> {
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl Drop for ScopedArchive {
    fn drop(&mut self) {
        if !self.released {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Extracts template archives and reconciles them into a target directory.
#[derive(Debug, Default)]
pub struct ArchiveDeployer<E: ArchiveExtractor> {
    extractor: E,
}

impl<E: ArchiveExtractor> ArchiveDeployer<E> {
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    /// Deploy `archive_path` into `target`, consuming the archive.
    ///
    /// Reports the `zip-list`, `extracted-summary`, `flatten` and `cleanup`
    /// steps on `tracker`. The caller owns the surrounding `extract` step.
    pub fn deploy(
        &self,
        archive_path: &Path,
        target: &DeploymentTarget,
        tracker: &mut ProgressTracker,
    ) -> TemplateResult<DeployReport> {
        let mut archive = ScopedArchive::new(archive_path);
        let target_existed = target.root_path.exists();

        let result = self.reconcile(archive.path(), target, tracker);

        if result.is_err() && target.is_fresh() && !target_existed {
            rollback_fresh(&target.root_path);
        }

        let removed = match archive.release() {
            Ok(true) => {
                tracker.complete(steps::CLEANUP, "");
                true
            }
            Ok(false) => {
                tracker.skip(steps::CLEANUP, "archive already removed");
                false
            }
            Err(e) => {
                warn!(archive = %archive_path.display(), error = %e, "Failed to remove archive");
                tracker.error(steps::CLEANUP, &e.to_string());
                false
            }
        };

        result.map(|report| DeployReport {
            archive_removed: removed,
            ..report
        })
    }

    fn reconcile(
        &self,
        archive_path: &Path,
        target: &DeploymentTarget,
        tracker: &mut ProgressTracker,
    ) -> TemplateResult<DeployReport> {
        tracker.start(steps::ZIP_LIST, "");
        let entries = self.extractor.list_contents(archive_path)?.len();
        tracker.complete(steps::ZIP_LIST, &format!("{} entries", entries));

        let scratch = create_scratch(target)?;
        let files_extracted = self.extractor.extract(archive_path, scratch.path())?;

        let items = read_entries(scratch.path())?;
        let top_level_items = items.len();
        tracker.start(steps::EXTRACTED_SUMMARY, "");
        let summary = match target.mode {
            DeployMode::Fresh => format!("{} top-level items", top_level_items),
            DeployMode::MergeInPlace => format!("temp {} items", top_level_items),
        };
        tracker.complete(steps::EXTRACTED_SUMMARY, &summary);

        let content_root = single_directory_root(&items)?;
        let flattened = content_root.is_some();
        let content_root = content_root.unwrap_or_else(|| scratch.path().to_path_buf());
        if flattened {
            tracker.complete(steps::FLATTEN, "");
        } else {
            tracker.skip(steps::FLATTEN, "no single root directory");
        }

        debug!(
            content_root = %content_root.display(),
            target = %target.root_path.display(),
            mode = ?target.mode,
            "Reconciling extracted template"
        );

        match target.mode {
            DeployMode::Fresh => {
                fs::create_dir_all(&target.root_path)
                    .map_err(|e| TemplateError::extraction(&target.root_path, e))?;
                move_children(&content_root, &target.root_path)?;
            }
            DeployMode::MergeInPlace => merge_children(&content_root, &target.root_path)?,
        }

        info!(
            target = %target.root_path.display(),
            entries,
            files_extracted,
            flattened,
            "Template deployed"
        );

        Ok(DeployReport {
            entries,
            files_extracted,
            top_level_items,
            flattened,
            archive_removed: false,
        })
    }
}

/// Remove a fresh target after a failed run.
pub fn rollback_fresh(path: &Path) {
    if !path.exists() {
        return;
    }
    match fs::remove_dir_all(path) {
        Ok(()) => debug!(path = %path.display(), "Rolled back fresh target"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to roll back target"),
    }
}

fn create_scratch(target: &DeploymentTarget) -> TemplateResult<TempDir> {
    match target.mode {
        DeployMode::Fresh => {
            let parent = parent_dir(&target.root_path);
            fs::create_dir_all(&parent).map_err(|e| TemplateError::extraction(&parent, e))?;
            tempfile::Builder::new()
                .prefix(FRESH_SCRATCH_PREFIX)
                .tempdir_in(&parent)
                .map_err(|e| TemplateError::extraction(&parent, e))
        }
        DeployMode::MergeInPlace => tempfile::Builder::new()
            .prefix(MERGE_SCRATCH_PREFIX)
            .tempdir()
            .map_err(|e| TemplateError::extraction(std::env::temp_dir(), e)),
    }
}

/// Parent of `path`, treating a bare relative name as the current directory.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn read_entries(dir: &Path) -> TemplateResult<Vec<DirEntry>> {
    fs::read_dir(dir)
        .map_err(|e| TemplateError::extraction(dir, e))?
        .map(|entry| entry.map_err(|e| TemplateError::extraction(dir, e)))
        .collect()
}

/// The wrapper directory when `items` is exactly one directory.
fn single_directory_root(items: &[DirEntry]) -> TemplateResult<Option<PathBuf>> {
    let [only] = items else {
        return Ok(None);
    };
    let file_type = only
        .file_type()
        .map_err(|e| TemplateError::extraction(only.path(), e))?;

    Ok(file_type.is_dir().then(|| only.path()))
}

/// Move every child of `source` into the freshly created `dest`.
fn move_children(source: &Path, dest: &Path) -> TemplateResult<()> {
    for entry in read_entries(source)? {
        let source_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if dest_path.exists() || fs::rename(&source_path, &dest_path).is_err() {
            let file_type = entry
                .file_type()
                .map_err(|e| TemplateError::extraction(&source_path, e))?;
            if file_type.is_dir() {
                copy_dir_recursive(&source_path, &dest_path)?;
            } else {
                copy_file(&source_path, &dest_path)?;
            }
        }
    }

    Ok(())
}

/// Copy every child of `source` into the existing `dest`, archive files
/// overwriting same-named destination files.
fn merge_children(source: &Path, dest: &Path) -> TemplateResult<()> {
    for entry in read_entries(source)? {
        let source_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| TemplateError::extraction(&source_path, e))?;

        if file_type.is_dir() {
            if dest_path.exists() {
                debug!(dir = %dest_path.display(), "Merging directory");
                overlay_files(&source_path, &dest_path)?;
            } else {
                copy_dir_recursive(&source_path, &dest_path)?;
            }
        } else {
            if dest_path.exists() {
                debug!(file = %dest_path.display(), "Overwriting file");
            }
            copy_file(&source_path, &dest_path)?;
        }
    }

    Ok(())
}

/// Walk `source` on disk and copy each file to the same relative path under
/// `dest`. Directories are created only when they receive a file.
fn overlay_files(source: &Path, dest: &Path) -> TemplateResult<()> {
    for entry in read_entries(source)? {
        let source_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| TemplateError::extraction(&source_path, e))?;

        if file_type.is_dir() {
            overlay_files(&source_path, &dest_path)?;
        } else {
            fs::create_dir_all(dest).map_err(|e| TemplateError::extraction(dest, e))?;
            copy_file(&source_path, &dest_path)?;
        }
    }

    Ok(())
}

/// Recursively copy a directory.
fn copy_dir_recursive(source: &Path, dest: &Path) -> TemplateResult<()> {
    fs::create_dir_all(dest).map_err(|e| TemplateError::extraction(dest, e))?;

    for entry in read_entries(source)? {
        let source_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| TemplateError::extraction(&source_path, e))?;

        if file_type.is_dir() {
            copy_dir_recursive(&source_path, &dest_path)?;
        } else {
            copy_file(&source_path, &dest_path)?;
        }
    }

    Ok(())
}

fn copy_file(source: &Path, dest: &Path) -> TemplateResult<()> {
    fs::copy(source, dest)
        .map(|_| ())
        .map_err(|e| TemplateError::extraction(dest, e))
}
