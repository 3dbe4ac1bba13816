//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/quotebook/config.toml)
//! 3. Environment variables (QUOTEBOOK_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "QUOTEBOOK";

/// Default remote endpoint for both fetching and posting quotes
pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Default seconds between sync cycles
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 10;

/// Default remote request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Directory for data storage (quote slots, debug log)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Remote endpoint quotes are fetched from (defaults to DEFAULT_REMOTE_URL)
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Remote endpoint new quotes are posted to (defaults to `remote_url`)
    #[serde(default)]
    pub push_url: Option<String>,

    /// Whether sync is enabled
    #[serde(default)]
    pub sync_enabled: bool,

    /// Seconds between periodic sync cycles
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,

    /// Timeout for each remote request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Log file path (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            remote_url: None,
            push_url: None,
            sync_enabled: false,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (QUOTEBOOK_DATA_DIR, QUOTEBOOK_REMOTE_URL, ...)
    /// 2. Config file (~/.config/quotebook/config.toml or QUOTEBOOK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring a path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            Self::load_from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            config
        };

        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Parse configuration from TOML text, then apply environment overrides
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_REMOTE_URL", ENV_PREFIX)) {
            self.remote_url = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_SYNC_ENABLED", ENV_PREFIX)) {
            self.sync_enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }

        if let Ok(val) = std::env::var(format!("{}_SYNC_INTERVAL", ENV_PREFIX)) {
            // Unparsable values keep the configured interval
            if let Ok(secs) = val.parse() {
                self.sync_interval_secs = secs;
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Set a single value by key, as used by `config set`
    ///
    /// Empty strings and `none` clear optional values.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |value: &str| {
            if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.to_string())
            }
        };

        match key {
            "data_dir" => self.data_dir = value.into(),
            "remote_url" => self.remote_url = optional(value),
            "push_url" => self.push_url = optional(value),
            "sync_enabled" => {
                self.sync_enabled = value
                    .parse()
                    .context("Invalid value for sync_enabled. Use 'true' or 'false'.")?;
            }
            "sync_interval_secs" => {
                let secs: u64 = value
                    .parse()
                    .context("Invalid value for sync_interval_secs. Use a whole number.")?;
                if secs == 0 {
                    bail!("sync_interval_secs must be at least 1");
                }
                self.sync_interval_secs = secs;
            }
            "request_timeout_secs" => {
                let secs: u64 = value
                    .parse()
                    .context("Invalid value for request_timeout_secs. Use a whole number.")?;
                if secs == 0 {
                    bail!("request_timeout_secs must be at least 1");
                }
                self.request_timeout_secs = secs;
            }
            "log_file" => self.log_file = optional(value).map(PathBuf::from),
            _ => {
                bail!(
                    "Unknown configuration key: '{}'\n\
                     Valid keys: {}",
                    key,
                    Self::KEYS.join(", ")
                );
            }
        }
        Ok(())
    }

    /// Keys accepted by [`Config::set_value`]
    pub const KEYS: &'static [&'static str] = &[
        "data_dir",
        "remote_url",
        "push_url",
        "sync_enabled",
        "sync_interval_secs",
        "request_timeout_secs",
        "log_file",
    ];

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with QUOTEBOOK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quotebook")
            .join("config.toml")
    }

    /// Endpoint quotes are fetched from
    pub fn effective_remote_url(&self) -> &str {
        self.remote_url.as_deref().unwrap_or(DEFAULT_REMOTE_URL)
    }

    /// Endpoint new quotes are posted to
    pub fn effective_push_url(&self) -> &str {
        self.push_url
            .as_deref()
            .unwrap_or_else(|| self.effective_remote_url())
    }

    /// Interval between sync cycles (never zero)
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs.max(1))
    }

    /// Timeout for a single remote request (never zero)
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Log file path, defaulting into the data directory
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quotebook")
}

fn default_sync_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
