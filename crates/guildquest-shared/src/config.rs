//! Configuration for GuildQuest
//!
//! Layered, later wins:
//!
//! ```text
//! defaults ─▶ guildquest.yaml ─▶ GUILDQUEST_* env ─▶ command-line flags
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
pub const CONFIG_FILE: &str = "guildquest.yaml";

pub const ENV_API_URL: &str = "GUILDQUEST_API_URL";
pub const ENV_DATA_DIR: &str = "GUILDQUEST_DATA_DIR";
pub const ENV_OFFLINE: &str = "GUILDQUEST_OFFLINE";

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildConfig {
    /// Base URL of the guild hall REST API
    pub api_base_url: String,

    /// Where the local cache and session keys live
    pub data_dir: PathBuf,

    /// Per-request timeout
    pub request_timeout_secs: u64,

    /// Period of the companion's decay tick
    pub decay_period_secs: u64,

    /// Play against the in-process hall instead of the REST API
    pub offline: bool,
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            data_dir: default_data_dir(),
            request_timeout_secs: 10,
            decay_period_secs: 60,
            offline: false,
        }
    }
}

/// `~/.guildquest`, or `./.guildquest` when there is no home directory
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".guildquest")
}

impl GuildConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Resolve the file and environment layers
    ///
    /// An explicit `path` must exist. Without one, `guildquest.yaml` in the
    /// default data directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let implicit = default_data_dir().join(CONFIG_FILE);
                if implicit.is_file() {
                    Self::from_file(&implicit)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `GUILDQUEST_*` overrides read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(flag) = lookup(ENV_OFFLINE) {
            self.offline = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "api_base_url",
                reason: format!("'{}' is not an http(s) URL", url),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.decay_period_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "decay_period_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    // ========== Builders ==========

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    // ========== Getters ==========

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn decay_period(&self) -> Duration {
        Duration::from_secs(self.decay_period_secs)
    }
}
