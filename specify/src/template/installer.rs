//! Template installer orchestrating the full project bootstrap.
//!
//! This module sequences the pipeline:
//! 1. Resolve the release asset for the requested variant
//! 2. Stream the archive into a per-run download directory
//! 3. Deploy the archive into the target directory
//! 4. Initialize a git repository (non-fatal)
//!
//! Every stage is registered on the [`ProgressTracker`] before the first one
//! runs. A fatal stage error marks that stage and `final` as failed and rolls
//! back a fresh target.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{info, warn};

use super::config::TemplateConfig;
use super::deployer::{rollback_fresh, ArchiveDeployer, DeployReport, DeploymentTarget};
use super::error::{TemplateError, TemplateResult};
use super::extractor::ZipExtractor;
use super::interrupt::InterruptFlag;
use super::release::{ReleaseMetadata, ReleaseResolver};
use super::steps;
use super::traits::{DownloadProgress, ReleaseClient, TemplateDownloader, VersionControlInitializer};
use crate::config::{format_byte_count, format_size};
use crate::progress::ProgressTracker;

/// Prefix of the per-run download directory.
const DOWNLOAD_DIR_PREFIX: &str = "specify-download-";

/// Minimum byte delta between tracker updates when the total is unknown.
const INDETERMINATE_REPORT_INTERVAL: u64 = 256 * 1024;

/// Callback receiving byte progress in [`ReportMode::Verbose`].
pub type DownloadCallback = Box<dyn Fn(DownloadProgress)>;

/// How pipeline progress reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Live step tree; byte progress is folded into the `download` step.
    #[default]
    Structured,
    /// Line output; byte progress goes to the download callback.
    Verbose,
}

/// Parameters of one installation.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    /// Variant key, e.g. `claude`.
    pub variant: String,
    /// Destination and reconciliation mode.
    pub target: DeploymentTarget,
    /// Whether to initialize git after deployment.
    pub init_git: bool,
    /// Whether the git executable was found.
    pub git_available: bool,
}

/// What happened in the git step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOutcome {
    Initialized,
    ExistingRepository,
    Failed(String),
    SkippedUnavailable,
    SkippedByFlag,
}

/// Result of a successful installation.
#[derive(Debug, Clone)]
pub struct InstallResult {
    /// Directory the template was deployed into.
    pub project_path: PathBuf,
    /// Asset that was deployed.
    pub release: ReleaseMetadata,
    /// Deployment summary.
    pub deploy: DeployReport,
    /// Outcome of the git step.
    pub git: GitOutcome,
}

/// Template installer.
///
/// Generic over its network and git collaborators so tests can run the whole
/// pipeline offline.
pub struct TemplateInstaller<C, D, V>
where
    C: ReleaseClient,
    D: TemplateDownloader,
    V: VersionControlInitializer,
{
    resolver: ReleaseResolver<C>,
    downloader: D,
    deployer: ArchiveDeployer<ZipExtractor>,
    vcs: V,
    download_dir: PathBuf,
    interrupt: InterruptFlag,
    mode: ReportMode,
    on_download: Option<DownloadCallback>,
}

impl<C, D, V> TemplateInstaller<C, D, V>
where
    C: ReleaseClient,
    D: TemplateDownloader,
    V: VersionControlInitializer,
{
    /// Create a new installer.
    pub fn new(client: C, downloader: D, vcs: V, config: &TemplateConfig) -> Self {
        Self {
            resolver: ReleaseResolver::new(client, config),
            downloader,
            deployer: ArchiveDeployer::new(ZipExtractor::new()),
            vcs,
            download_dir: config.download_dir.clone(),
            interrupt: InterruptFlag::new(),
            mode: ReportMode::default(),
            on_download: None,
        }
    }

    /// Poll `interrupt` at every stage boundary.
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Set the report mode.
    pub fn with_report_mode(mut self, mode: ReportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Receive raw byte progress in [`ReportMode::Verbose`].
    pub fn with_download_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(DownloadProgress) + 'static,
    {
        self.on_download = Some(Box::new(callback));
        self
    }

    /// Run the pipeline for `request`.
    pub fn install(
        &self,
        request: &InstallRequest,
        tracker: &mut ProgressTracker,
    ) -> TemplateResult<InstallResult> {
        steps::register_plan(tracker);
        let target_existed = request.target.root_path.exists();

        match self.run(request, tracker) {
            Ok(result) => {
                tracker.complete(steps::FINAL, "project ready");
                info!(
                    project = %result.project_path.display(),
                    release = %result.release.release_tag,
                    "Project initialized"
                );
                Ok(result)
            }
            Err(e) => {
                tracker.error(steps::FINAL, &e.to_string());
                if request.target.is_fresh() && !target_existed {
                    rollback_fresh(&request.target.root_path);
                }
                warn!(error = %e, "Project initialization failed");
                Err(e)
            }
        }
    }

    fn run(
        &self,
        request: &InstallRequest,
        tracker: &mut ProgressTracker,
    ) -> TemplateResult<InstallResult> {
        let release = self.run_stage(tracker, steps::FETCH, |t| {
            t.start(steps::FETCH, "contacting release endpoint");
            let metadata = self.resolver.resolve(&request.variant)?;
            t.complete(
                steps::FETCH,
                &format!(
                    "release {} ({} bytes)",
                    metadata.release_tag,
                    format_byte_count(metadata.size_bytes)
                ),
            );
            Ok(metadata)
        })?;

        // The directory and everything in it is removed when dropped
        let (_download_dir, archive_path) = self.run_stage(tracker, steps::DOWNLOAD, |t| {
            t.start(steps::DOWNLOAD, &release.filename);
            let dir = self.create_download_dir()?;
            let archive = self.download(&release, dir.path(), t)?;
            t.complete(steps::DOWNLOAD, &release.filename);
            Ok((dir, archive))
        })?;

        let deploy = self.run_stage(tracker, steps::EXTRACT, |t| {
            t.start(steps::EXTRACT, "");
            let report = self.deployer.deploy(&archive_path, &request.target, t)?;
            t.complete(
                steps::EXTRACT,
                &format!("{} files", report.files_extracted),
            );
            Ok(report)
        })?;

        self.interrupt.check().inspect_err(|e| {
            tracker.error(steps::GIT, &e.to_string());
        })?;
        let git = self.init_git(request, tracker);

        Ok(InstallResult {
            project_path: request.target.root_path.clone(),
            release,
            deploy,
            git,
        })
    }

    /// Run one stage, marking `key` as failed when it errors.
    fn run_stage<T>(
        &self,
        tracker: &mut ProgressTracker,
        key: &str,
        stage: impl FnOnce(&mut ProgressTracker) -> TemplateResult<T>,
    ) -> TemplateResult<T> {
        let result = self.interrupt.check().and_then(|()| stage(tracker));
        if let Err(e) = &result {
            tracker.error(key, &e.to_string());
        }
        result
    }

    fn create_download_dir(&self) -> TemplateResult<TempDir> {
        std::fs::create_dir_all(&self.download_dir).map_err(|e| TemplateError::WriteFailed {
            path: self.download_dir.clone(),
            source: e,
        })?;

        tempfile::Builder::new()
            .prefix(DOWNLOAD_DIR_PREFIX)
            .tempdir_in(&self.download_dir)
            .map_err(|e| TemplateError::WriteFailed {
                path: self.download_dir.clone(),
                source: e,
            })
    }

    fn download(
        &self,
        release: &ReleaseMetadata,
        dest_dir: &Path,
        tracker: &mut ProgressTracker,
    ) -> TemplateResult<PathBuf> {
        match self.mode {
            ReportMode::Structured => {
                let mut throttle = ProgressThrottle::default();
                self.downloader.download(release, dest_dir, &mut |progress| {
                    if let Some(detail) = throttle.detail(&release.filename, progress) {
                        tracker.start(steps::DOWNLOAD, &detail);
                    }
                })
            }
            ReportMode::Verbose => self.downloader.download(release, dest_dir, &mut |progress| {
                if let Some(callback) = &self.on_download {
                    callback(progress);
                }
            }),
        }
    }

    fn init_git(&self, request: &InstallRequest, tracker: &mut ProgressTracker) -> GitOutcome {
        let path = &request.target.root_path;

        if !request.init_git {
            tracker.skip(steps::GIT, "--no-git flag");
            return GitOutcome::SkippedByFlag;
        }

        tracker.start(steps::GIT, "");

        if self.vcs.is_repository(path) {
            tracker.complete(steps::GIT, "existing repo detected");
            return GitOutcome::ExistingRepository;
        }

        if !request.git_available {
            tracker.skip(steps::GIT, "git not installed");
            return GitOutcome::SkippedUnavailable;
        }

        match self.vcs.initialize(path) {
            Ok(()) => {
                tracker.complete(steps::GIT, "initialized");
                GitOutcome::Initialized
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Git initialization failed");
                tracker.error(steps::GIT, "init failed");
                GitOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Limits how often byte progress rewrites the `download` step.
#[derive(Debug, Default)]
struct ProgressThrottle {
    last_percent: Option<u64>,
    last_bytes: Option<u64>,
}

impl ProgressThrottle {
    /// New detail text when it is worth redrawing.
    fn detail(&mut self, filename: &str, progress: DownloadProgress) -> Option<String> {
        match progress {
            DownloadProgress::Determinate { written, total } => {
                let percent = if total == 0 {
                    100
                } else {
                    (written.min(total) * 100) / total
                };
                if self.last_percent == Some(percent) {
                    return None;
                }
                self.last_percent = Some(percent);
                Some(format!("{} {}%", filename, percent))
            }
            DownloadProgress::Indeterminate { written } => {
                let due = match self.last_bytes {
                    Some(last) => written.saturating_sub(last) >= INDETERMINATE_REPORT_INTERVAL,
                    None => true,
                };
                if !due {
                    return None;
                }
                self.last_bytes = Some(written);
                Some(format!("{} {}", filename, format_size(written)))
            }
        }
    }
}
