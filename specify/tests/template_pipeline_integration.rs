//! Integration tests for the template pipeline.
//!
//! These tests drive `TemplateInstaller` end to end with in-memory release
//! metadata, a local-file downloader and a recording git fake:
//! - Fresh deployment with and without a wrapper directory
//! - Merge into an existing directory
//! - Rollback and archive cleanup on every failure path
//! - Git step outcomes
//!
//! Run with: `cargo test --test template_pipeline_integration`

use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use specify::progress::{ProgressTracker, StepStatus};
use specify::template::steps;
use specify::template::{
    DeploymentTarget, DownloadProgress, GitOutcome, InstallRequest, InterruptFlag, Release,
    ReleaseAsset, ReleaseClient, ReleaseMetadata, ReportMode, TemplateConfig, TemplateDownloader,
    TemplateError, TemplateInstaller, TemplateResult, VersionControlInitializer,
};

// ============================================================================
// Fakes
// ============================================================================

/// Release client serving a fixed asset list, or failing like a dead network.
struct FakeReleaseClient {
    assets: Option<Vec<&'static str>>,
}

impl FakeReleaseClient {
    fn with_assets(assets: Vec<&'static str>) -> Self {
        Self {
            assets: Some(assets),
        }
    }

    fn offline() -> Self {
        Self { assets: None }
    }
}

impl ReleaseClient for FakeReleaseClient {
    fn fetch_latest_release(&self) -> TemplateResult<Release> {
        let assets = self.assets.as_ref().ok_or_else(|| {
            TemplateError::network("https://api.github.com", "connection refused")
        })?;

        Ok(Release {
            tag_name: "v0.0.20".to_string(),
            assets: assets
                .iter()
                .map(|name| ReleaseAsset {
                    name: name.to_string(),
                    size: 2048,
                    browser_download_url: format!("https://example.com/{}", name),
                })
                .collect(),
        })
    }
}

/// Downloader that copies a local fixture archive.
struct LocalDownloader {
    fixture: PathBuf,
    fail: bool,
}

impl TemplateDownloader for LocalDownloader {
    fn download(
        &self,
        metadata: &ReleaseMetadata,
        dest_dir: &Path,
        on_progress: &mut dyn FnMut(DownloadProgress),
    ) -> TemplateResult<PathBuf> {
        if self.fail {
            return Err(TemplateError::network(
                &metadata.asset_download_url,
                "connection reset",
            ));
        }

        let dest = dest_dir.join(&metadata.filename);
        let total = fs::copy(&self.fixture, &dest).map_err(|e| TemplateError::WriteFailed {
            path: dest.clone(),
            source: e,
        })?;
        on_progress(DownloadProgress::Determinate { written: 0, total });
        on_progress(DownloadProgress::Determinate {
            written: total,
            total,
        });
        Ok(dest)
    }
}

/// Git fake recording initialized paths.
#[derive(Default)]
struct RecordingGit {
    existing_repo: bool,
    fail: bool,
    initialized: RefCell<Vec<PathBuf>>,
}

impl VersionControlInitializer for RecordingGit {
    fn is_repository(&self, _path: &Path) -> bool {
        self.existing_repo
    }

    fn initialize(&self, path: &Path) -> TemplateResult<()> {
        if self.fail {
            return Err(TemplateError::VersionControl(
                "git commit failed: author identity unknown".to_string(),
            ));
        }
        self.initialized.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

const CLAUDE_ASSET: &str = "spec-kit-template-claude-v0.0.20.zip";

/// Workspace holding the fixture archive, the download root and targets.
struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("downloads")).unwrap();
        Self { root }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    fn fixture(&self, dirs: &[&str], files: &[(&str, &str)]) -> PathBuf {
        let path = self.path("fixture.zip");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        let options = SimpleFileOptions::default();
        for dir in dirs {
            zip.add_directory(*dir, options).unwrap();
        }
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        path
    }

    fn config(&self) -> TemplateConfig {
        TemplateConfig::new().with_download_dir(self.path("downloads"))
    }

    fn downloads_are_empty(&self) -> bool {
        fs::read_dir(self.path("downloads")).unwrap().count() == 0
    }
}

fn wrapped_fixture(ws: &Workspace) -> PathBuf {
    ws.fixture(
        &["spec-kit/", "spec-kit/b/"],
        &[("spec-kit/a.txt", "alpha"), ("spec-kit/b/c.txt", "gamma")],
    )
}

fn installer(
    ws: &Workspace,
    client: FakeReleaseClient,
    fixture: PathBuf,
    git: RecordingGit,
) -> TemplateInstaller<FakeReleaseClient, LocalDownloader, RecordingGit> {
    let downloader = LocalDownloader {
        fixture,
        fail: false,
    };
    TemplateInstaller::new(client, downloader, git, &ws.config())
}

fn request(target: DeploymentTarget) -> InstallRequest {
    InstallRequest {
        variant: "claude".to_string(),
        target,
        init_git: true,
        git_available: true,
    }
}

fn status(tracker: &ProgressTracker, key: &str) -> StepStatus {
    tracker.step(key).unwrap().status
}

// ============================================================================
// Deployment
// ============================================================================

#[test]
fn test_fresh_install_flattens_wrapper_directory() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let target = ws.path("my-project");
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        RecordingGit::default(),
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);

    let result = installer
        .install(&request(DeploymentTarget::fresh(&target)), &mut tracker)
        .unwrap();

    assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(target.join("b/c.txt")).unwrap(), "gamma");
    assert!(!target.join("spec-kit").exists());
    assert!(result.deploy.flattened);
    assert!(result.deploy.archive_removed);
    assert_eq!(result.release.filename, CLAUDE_ASSET);
    assert_eq!(result.git, GitOutcome::Initialized);
    assert!(ws.downloads_are_empty());

    assert_eq!(status(&tracker, steps::FETCH), StepStatus::Done);
    assert_eq!(
        tracker.step(steps::FETCH).unwrap().detail,
        "release v0.0.20 (2,048 bytes)"
    );
    assert_eq!(tracker.step(steps::DOWNLOAD).unwrap().detail, CLAUDE_ASSET);
    assert_eq!(status(&tracker, steps::FLATTEN), StepStatus::Done);
    assert_eq!(status(&tracker, steps::CLEANUP), StepStatus::Done);
    assert_eq!(status(&tracker, steps::FINAL), StepStatus::Done);
}

#[test]
fn test_fresh_install_without_wrapper_keeps_layout() {
    let ws = Workspace::new();
    let fixture = ws.fixture(&[], &[("a.txt", "a"), ("b.txt", "b")]);
    let target = ws.path("flat");
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        RecordingGit::default(),
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);

    let result = installer
        .install(&request(DeploymentTarget::fresh(&target)), &mut tracker)
        .unwrap();

    assert!(!result.deploy.flattened);
    assert!(target.join("a.txt").is_file());
    assert!(target.join("b.txt").is_file());
    assert_eq!(status(&tracker, steps::FLATTEN), StepStatus::Skipped);
}

#[test]
fn test_merge_keeps_existing_files_and_archive_wins_conflicts() {
    let ws = Workspace::new();
    let fixture = ws.fixture(
        &["spec-kit/"],
        &[
            ("spec-kit/a.txt", "from template"),
            ("spec-kit/README.md", "template readme"),
        ],
    );
    let target = ws.path("existing");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("existing.txt"), "mine").unwrap();
    fs::write(target.join("README.md"), "my readme").unwrap();

    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        RecordingGit::default(),
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);

    installer
        .install(
            &request(DeploymentTarget::merge_in_place(&target)),
            &mut tracker,
        )
        .unwrap();

    assert_eq!(fs::read_to_string(target.join("existing.txt")).unwrap(), "mine");
    assert_eq!(
        fs::read_to_string(target.join("a.txt")).unwrap(),
        "from template"
    );
    assert_eq!(
        fs::read_to_string(target.join("README.md")).unwrap(),
        "template readme"
    );
    assert!(ws.downloads_are_empty());
    assert_eq!(
        tracker.step(steps::EXTRACTED_SUMMARY).unwrap().detail,
        "temp 1 items"
    );
}

// ============================================================================
// Failure and Rollback
// ============================================================================

#[test]
fn test_network_error_leaves_no_fresh_target() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let target = ws.path("never-created");
    let installer = installer(
        &ws,
        FakeReleaseClient::offline(),
        fixture,
        RecordingGit::default(),
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);

    let result = installer.install(&request(DeploymentTarget::fresh(&target)), &mut tracker);

    assert!(matches!(result, Err(TemplateError::Network { .. })));
    assert!(!target.exists());
    assert_eq!(status(&tracker, steps::FETCH), StepStatus::Error);
    assert_eq!(status(&tracker, steps::DOWNLOAD), StepStatus::Pending);
    assert_eq!(status(&tracker, steps::FINAL), StepStatus::Error);
    assert!(tracker
        .step(steps::FETCH)
        .unwrap()
        .detail
        .contains("connection refused"));
}

#[test]
fn test_missing_variant_asset_lists_available_assets() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec!["spec-kit-template-gemini-v0.0.20.zip"]),
        fixture,
        RecordingGit::default(),
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);

    let result = installer.install(
        &request(DeploymentTarget::fresh(ws.path("p"))),
        &mut tracker,
    );

    match result {
        Err(e @ TemplateError::NoMatchingAsset { .. }) => {
            assert!(e
                .to_string()
                .contains("spec-kit-template-gemini-v0.0.20.zip"));
        }
        other => panic!("expected NoMatchingAsset, got {:?}", other),
    }
    assert!(!ws.path("p").exists());
}

#[test]
fn test_download_failure_rolls_back() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let target = ws.path("proj");
    let downloader = LocalDownloader {
        fixture,
        fail: true,
    };
    let installer = TemplateInstaller::new(
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        downloader,
        RecordingGit::default(),
        &ws.config(),
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);

    let result = installer.install(&request(DeploymentTarget::fresh(&target)), &mut tracker);

    assert!(matches!(result, Err(TemplateError::Network { .. })));
    assert!(!target.exists());
    assert!(ws.downloads_are_empty());
    assert_eq!(status(&tracker, steps::DOWNLOAD), StepStatus::Error);
    assert_eq!(status(&tracker, steps::FINAL), StepStatus::Error);
}

#[test]
fn test_corrupt_archive_rolls_back_and_removes_archive() {
    let ws = Workspace::new();
    let fixture = ws.path("fixture.zip");
    fs::write(&fixture, b"this is not a zip archive").unwrap();
    let target = ws.path("proj");
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        RecordingGit::default(),
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);

    let result = installer.install(&request(DeploymentTarget::fresh(&target)), &mut tracker);

    assert!(matches!(result, Err(TemplateError::Extraction { .. })));
    assert!(!target.exists());
    assert!(ws.downloads_are_empty());
    assert_eq!(status(&tracker, steps::EXTRACT), StepStatus::Error);
    assert_eq!(status(&tracker, steps::CLEANUP), StepStatus::Done);
    assert_eq!(status(&tracker, steps::GIT), StepStatus::Pending);
}

#[test]
fn test_failure_never_deletes_merge_target() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let target = ws.path("existing");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("notes.txt"), "keep").unwrap();
    let installer = installer(
        &ws,
        FakeReleaseClient::offline(),
        fixture,
        RecordingGit::default(),
    );

    let result = installer.install(
        &request(DeploymentTarget::merge_in_place(&target)),
        &mut ProgressTracker::new(steps::TRACKER_TITLE),
    );

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(target.join("notes.txt")).unwrap(), "keep");
}

#[test]
fn test_interrupt_before_fetch() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let target = ws.path("proj");
    let interrupt = InterruptFlag::new();
    interrupt.raise();
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        RecordingGit::default(),
    )
    .with_interrupt(interrupt);
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);

    let result = installer.install(&request(DeploymentTarget::fresh(&target)), &mut tracker);

    assert!(matches!(result, Err(TemplateError::Interrupted)));
    assert!(!target.exists());
    assert_eq!(status(&tracker, steps::FETCH), StepStatus::Error);
}

// ============================================================================
// Git Step
// ============================================================================

#[test]
fn test_git_failure_is_not_fatal() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let target = ws.path("proj");
    let git = RecordingGit {
        fail: true,
        ..Default::default()
    };
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        git,
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);

    let result = installer
        .install(&request(DeploymentTarget::fresh(&target)), &mut tracker)
        .unwrap();

    assert!(matches!(result.git, GitOutcome::Failed(_)));
    assert!(target.join("a.txt").is_file());
    assert_eq!(status(&tracker, steps::GIT), StepStatus::Error);
    assert_eq!(status(&tracker, steps::FINAL), StepStatus::Done);
}

#[test]
fn test_no_git_flag_skips_step() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        RecordingGit::default(),
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);
    let mut req = request(DeploymentTarget::fresh(ws.path("proj")));
    req.init_git = false;

    let result = installer.install(&req, &mut tracker).unwrap();

    assert_eq!(result.git, GitOutcome::SkippedByFlag);
    assert_eq!(status(&tracker, steps::GIT), StepStatus::Skipped);
    assert_eq!(tracker.step(steps::GIT).unwrap().detail, "--no-git flag");
}

#[test]
fn test_existing_repository_detected() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let target = ws.path("repo");
    fs::create_dir_all(&target).unwrap();
    let git = RecordingGit {
        existing_repo: true,
        ..Default::default()
    };
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        git,
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);

    let result = installer
        .install(
            &request(DeploymentTarget::merge_in_place(&target)),
            &mut tracker,
        )
        .unwrap();

    assert_eq!(result.git, GitOutcome::ExistingRepository);
    assert_eq!(
        tracker.step(steps::GIT).unwrap().detail,
        "existing repo detected"
    );
}

#[test]
fn test_git_unavailable_skips_step() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        RecordingGit::default(),
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);
    let mut req = request(DeploymentTarget::fresh(ws.path("proj")));
    req.git_available = false;

    let result = installer.install(&req, &mut tracker).unwrap();

    assert_eq!(result.git, GitOutcome::SkippedUnavailable);
    assert_eq!(status(&tracker, steps::GIT), StepStatus::Skipped);
}

// ============================================================================
// Reporting
// ============================================================================

#[test]
fn test_every_step_terminal_after_success() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        RecordingGit::default(),
    );
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);
    tracker.add(steps::PRECHECK, "Check required tools");
    tracker.complete(steps::PRECHECK, "ok");
    tracker.add(steps::AI_SELECT, "Select AI assistant");
    tracker.complete(steps::AI_SELECT, "claude");

    installer
        .install(
            &request(DeploymentTarget::fresh(ws.path("proj"))),
            &mut tracker,
        )
        .unwrap();

    assert_eq!(tracker.steps().len(), steps::PLAN.len());
    for step in tracker.steps() {
        assert!(
            step.status.is_terminal(),
            "step {} left {}",
            step.key,
            step.status
        );
    }
}

#[test]
fn test_observer_sees_plan_before_fetch_runs() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        RecordingGit::default(),
    );
    let first_running_plan = Rc::new(Cell::new(0usize));
    let seen = Rc::clone(&first_running_plan);
    let mut tracker = ProgressTracker::new(steps::TRACKER_TITLE);
    tracker.attach_observer(move |t| {
        if seen.get() == 0 && t.steps().iter().any(|s| s.status == StepStatus::Running) {
            seen.set(t.steps().len());
        }
        Ok(())
    });

    installer
        .install(
            &request(DeploymentTarget::fresh(ws.path("proj"))),
            &mut tracker,
        )
        .unwrap();

    assert_eq!(first_running_plan.get(), steps::PLAN.len());
}

#[test]
fn test_verbose_mode_forwards_download_progress() {
    let ws = Workspace::new();
    let fixture = wrapped_fixture(&ws);
    let received = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&received);
    let installer = installer(
        &ws,
        FakeReleaseClient::with_assets(vec![CLAUDE_ASSET]),
        fixture,
        RecordingGit::default(),
    )
    .with_report_mode(ReportMode::Verbose)
    .with_download_callback(move |p| sink.borrow_mut().push(p));

    installer
        .install(
            &request(DeploymentTarget::fresh(ws.path("proj"))),
            &mut ProgressTracker::new(steps::TRACKER_TITLE),
        )
        .unwrap();

    let received = received.borrow();
    assert_eq!(received.len(), 2);
    assert_eq!(received[1].fraction(), Some(1.0));
}
