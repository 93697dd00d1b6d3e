//! Configuration for the template pipeline.

use std::path::PathBuf;
use std::time::Duration;

/// Default release API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default owner of the template repository.
pub const DEFAULT_OWNER: &str = "github";

/// Default template repository name.
pub const DEFAULT_REPOSITORY: &str = "spec-kit";

/// Fixed prefix shared by all template asset names.
pub const DEFAULT_ASSET_PREFIX: &str = "spec-kit-template";

/// Extension of template archives.
pub const DEFAULT_ARCHIVE_EXTENSION: &str = ".zip";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for resolving, downloading and deploying templates.
#[derive(Debug, Clone)]
pub struct TemplateConfig {
    /// Base URL of the release API.
    pub api_base: String,

    /// Owner of the template repository.
    pub owner: String,

    /// Template repository name.
    pub repository: String,

    /// Asset name prefix; assets are matched on `{prefix}-{variant}`.
    pub asset_prefix: String,

    /// Required asset name suffix.
    pub archive_extension: String,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Directory under which per-run download directories are created.
    pub download_dir: PathBuf,

    /// Bearer token sent to the release API, if any.
    pub api_token: Option<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            download_dir: std::env::temp_dir(),
            api_token: None,
        }
    }
}

impl TemplateConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// URL of the latest-release endpoint.
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base.trim_end_matches('/'),
            self.owner,
            self.repository
        )
    }

    /// Set the release API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the template repository.
    pub fn with_repository(mut self, owner: impl Into<String>, name: impl Into<String>) -> Self {
        self.owner = owner.into();
        self.repository = name.into();
        self
    }

    /// Set the asset naming convention.
    pub fn with_asset_naming(
        mut self,
        prefix: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        self.asset_prefix = prefix.into();
        self.archive_extension = extension.into();
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the download directory.
    pub fn with_download_dir(mut self, path: PathBuf) -> Self {
        self.download_dir = path;
        self
    }

    /// Set the API token.
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TemplateConfig::default();
        assert_eq!(config.owner, "github");
        assert_eq!(config.repository, "spec-kit");
        assert_eq!(config.asset_prefix, "spec-kit-template");
        assert_eq!(config.archive_extension, ".zip");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_latest_release_url() {
        let config = TemplateConfig::default();
        assert_eq!(
            config.latest_release_url(),
            "https://api.github.com/repos/github/spec-kit/releases/latest"
        );
    }

    #[test]
    fn test_builder_pattern() {
        let config = TemplateConfig::new()
            .with_api_base("http://localhost:8080/")
            .with_repository("acme", "templates")
            .with_asset_naming("acme-template", ".zip")
            .with_timeout(Duration::from_secs(5))
            .with_download_dir(PathBuf::from("/var/tmp"))
            .with_api_token(Some("  ".to_string()));

        assert_eq!(
            config.latest_release_url(),
            "http://localhost:8080/repos/acme/templates/releases/latest"
        );
        assert_eq!(config.asset_prefix, "acme-template");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.download_dir, PathBuf::from("/var/tmp"));
        assert!(config.api_token.is_none(), "blank tokens are dropped");
    }
}
