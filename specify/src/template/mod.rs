//! Template acquisition and deployment.
//!
//! This module turns a variant key into a populated project directory:
//!
//! - [`ReleaseResolver`] picks the asset for a variant from the latest release
//! - [`HttpDownloader`] streams it to disk with byte progress
//! - [`ArchiveDeployer`] extracts, flattens and reconciles it into the target
//! - [`TemplateInstaller`] sequences the above and reports every stage on a
//!   [`ProgressTracker`](crate::progress::ProgressTracker)
//!
//! Network and git access sit behind the traits in [`traits`] so the
//! pipeline can be driven offline.

pub mod config;
pub mod deployer;
pub mod download;
pub mod error;
pub mod extractor;
pub mod installer;
pub mod interrupt;
pub mod release;
pub mod steps;
pub mod traits;

pub use config::TemplateConfig;
pub use deployer::{ArchiveDeployer, DeployMode, DeployReport, DeploymentTarget};
pub use download::HttpDownloader;
pub use error::{TemplateError, TemplateResult};
pub use extractor::ZipExtractor;
pub use installer::{
    DownloadCallback, GitOutcome, InstallRequest, InstallResult, ReportMode, TemplateInstaller,
};
pub use interrupt::InterruptFlag;
pub use release::{
    check_connectivity, HttpReleaseClient, Release, ReleaseAsset, ReleaseMetadata,
    ReleaseResolver,
};
pub use traits::{
    ArchiveExtractor, DownloadProgress, ReleaseClient, TemplateDownloader,
    ToolAvailabilityChecker, VersionControlInitializer,
};
