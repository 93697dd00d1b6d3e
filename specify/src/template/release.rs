//! Release metadata resolution.
//!
//! Queries the latest-release endpoint and picks the template asset for a
//! variant. Asset names are matched by substring and suffix:
//! `{prefix}-{variant}*{extension}`. When several assets match, the first in
//! endpoint order wins.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, info};

use super::config::TemplateConfig;
use super::error::{TemplateError, TemplateResult};
use super::traits::ReleaseClient;

/// User agent sent with every request.
pub const CLIENT_USER_AGENT: &str = concat!("specify-cli/", env!("CARGO_PKG_VERSION"));

/// Timeout for the `check` connectivity probe.
pub const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Release descriptor as returned by the endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// One downloadable release asset.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    pub browser_download_url: String,
}

impl Release {
    /// Names of all assets, in endpoint order.
    pub fn asset_names(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.name.clone()).collect()
    }
}

/// Metadata of the asset selected for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    pub filename: String,
    pub size_bytes: u64,
    pub release_tag: String,
    pub asset_download_url: String,
}

/// Select the first asset whose name contains `pattern` and ends with
/// `extension`.
pub fn select_asset<'a>(
    release: &'a Release,
    pattern: &str,
    extension: &str,
) -> Option<&'a ReleaseAsset> {
    release
        .assets
        .iter()
        .find(|asset| asset.name.contains(pattern) && asset.name.ends_with(extension))
}

/// HTTP client for the latest-release endpoint.
#[derive(Debug)]
pub struct HttpReleaseClient {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HttpReleaseClient {
    /// Create a client for the endpoint described by `config`.
    pub fn new(config: &TemplateConfig) -> TemplateResult<Self> {
        let url = config.latest_release_url();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TemplateError::network(&url, e))?;

        Ok(Self {
            client,
            url,
            token: config.api_token.clone(),
        })
    }

    /// Endpoint URL queried by this client.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReleaseClient for HttpReleaseClient {
    fn fetch_latest_release(&self) -> TemplateResult<Release> {
        debug!(url = %self.url, "Fetching latest release");

        let mut request = self
            .client
            .get(&self.url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .map_err(|e| TemplateError::network(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TemplateError::network(
                &self.url,
                format!("request failed with status {}", status),
            ));
        }

        response
            .json::<Release>()
            .map_err(|e| TemplateError::network(&self.url, format!("invalid release JSON: {}", e)))
    }
}

/// Resolves the template asset for a variant.
#[derive(Debug)]
pub struct ReleaseResolver<C: ReleaseClient> {
    client: C,
    asset_prefix: String,
    archive_extension: String,
}

impl<C: ReleaseClient> ReleaseResolver<C> {
    /// Create a resolver using the naming convention from `config`.
    pub fn new(client: C, config: &TemplateConfig) -> Self {
        Self {
            client,
            asset_prefix: config.asset_prefix.clone(),
            archive_extension: config.archive_extension.clone(),
        }
    }

    /// Asset name pattern for `variant`.
    pub fn pattern(&self, variant: &str) -> String {
        format!("{}-{}", self.asset_prefix, variant)
    }

    /// Fetch the latest release and return the asset for `variant`.
    ///
    /// A single attempt is made; transport failures are not retried.
    pub fn resolve(&self, variant: &str) -> TemplateResult<ReleaseMetadata> {
        let release = self.client.fetch_latest_release()?;
        let pattern = self.pattern(variant);

        let asset = select_asset(&release, &pattern, &self.archive_extension).ok_or_else(|| {
            TemplateError::NoMatchingAsset {
                variant: variant.to_string(),
                release: release.tag_name.clone(),
                available: release.asset_names(),
            }
        })?;

        info!(
            asset = %asset.name,
            size = asset.size,
            release = %release.tag_name,
            "Resolved template asset"
        );

        Ok(ReleaseMetadata {
            filename: asset.name.clone(),
            size_bytes: asset.size,
            release_tag: release.tag_name.clone(),
            asset_download_url: asset.browser_download_url.clone(),
        })
    }
}

/// Probe that the release API is reachable.
///
/// Any HTTP response counts as reachable; only transport failures fail.
pub fn check_connectivity(api_base: &str, timeout: Duration) -> TemplateResult<()> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TemplateError::network(api_base, e))?;

    client
        .get(api_base)
        .header(USER_AGENT, CLIENT_USER_AGENT)
        .send()
        .map(|_| ())
        .map_err(|e| TemplateError::network(api_base, e))
}
