//! Configuration file handling.
//!
//! Settings are read from `~/.config/specify/config.ini`. A missing file is
//! not an error: every key has a default, and callers load with
//! `ConfigFile::load().unwrap_or_default()`.
//!
//! ```ini
//! [release]
//! owner = github
//! repository = spec-kit
//! api_base = https://api.github.com
//! asset_prefix = spec-kit-template
//! archive_extension = .zip
//!
//! [network]
//! timeout_secs = 30
//!
//! [logging]
//! directory = /home/me/.cache/specify
//!
//! [ui]
//! default_variant = copilot
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::debug;

use crate::template::config::{
    TemplateConfig, DEFAULT_API_BASE, DEFAULT_ARCHIVE_EXTENSION, DEFAULT_ASSET_PREFIX,
    DEFAULT_OWNER, DEFAULT_REPOSITORY, DEFAULT_TIMEOUT_SECS,
};
use crate::variant::{find_variant, DEFAULT_VARIANT};

/// Environment variables checked, in order, for a release API token.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("invalid value '{value}' for {section}.{key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

/// `[release]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSettings {
    pub owner: String,
    pub repository: String,
    pub api_base: String,
    pub asset_prefix: String,
    pub archive_extension: String,
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            repository: DEFAULT_REPOSITORY.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
            archive_extension: DEFAULT_ARCHIVE_EXTENSION.to_string(),
        }
    }
}

/// `[network]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    pub timeout_secs: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_dir(),
        }
    }
}

/// `[ui]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiSettings {
    pub default_variant: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            default_variant: DEFAULT_VARIANT.to_string(),
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub release: ReleaseSettings,
    pub network: NetworkSettings,
    pub logging: LoggingSettings,
    pub ui: UiSettings,
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path. Keys absent from the file keep their
    /// defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        let get = |section: &str, key: &str| -> Option<String> {
            ini.section(Some(section))
                .and_then(|props| props.get(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("release", "owner") {
            config.release.owner = v;
        }
        if let Some(v) = get("release", "repository") {
            config.release.repository = v;
        }
        if let Some(v) = get("release", "api_base") {
            config.release.api_base = v;
        }
        if let Some(v) = get("release", "asset_prefix") {
            config.release.asset_prefix = v;
        }
        if let Some(v) = get("release", "archive_extension") {
            config.release.archive_extension = v;
        }
        if let Some(v) = get("network", "timeout_secs") {
            config.network.timeout_secs = match v.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        section: "network".to_string(),
                        key: "timeout_secs".to_string(),
                        value: v,
                    })
                }
            };
        }
        if let Some(v) = get("logging", "directory") {
            config.logging.directory = PathBuf::from(v);
        }
        if let Some(v) = get("ui", "default_variant") {
            if find_variant(&v).is_none() {
                return Err(ConfigError::InvalidValue {
                    section: "ui".to_string(),
                    key: "default_variant".to_string(),
                    value: v,
                });
            }
            config.ui.default_variant = v;
        }

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Pipeline configuration without credentials.
    pub fn template_config(&self) -> TemplateConfig {
        TemplateConfig::new()
            .with_api_base(self.release.api_base.clone())
            .with_repository(self.release.owner.clone(), self.release.repository.clone())
            .with_asset_naming(
                self.release.asset_prefix.clone(),
                self.release.archive_extension.clone(),
            )
            .with_timeout(Duration::from_secs(self.network.timeout_secs))
    }

    /// Pipeline configuration including any token from the environment.
    pub fn to_template_config(&self) -> TemplateConfig {
        self.template_config().with_api_token(api_token_from_env())
    }
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("specify")
        .join("config.ini")
}

fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("specify")
}

/// First non-empty token from [`TOKEN_ENV_VARS`].
pub fn api_token_from_env() -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Format a size in bytes as a human-readable string.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format a byte count with thousands separators, e.g. `52,413`.
pub fn format_byte_count(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
