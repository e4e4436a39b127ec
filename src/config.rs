//! Configuration management for champlb using the prefer crate.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::rate_limit::{RateLimitConfig, DEFAULT_DIVISOR, DEFAULT_MARGIN};

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "RIOT_API_KEY";

/// Default data file, relative to the config file's directory.
pub const DEFAULT_DATA_FILE: &str = "data/leaderboard.json";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Riot API credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiotConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Leaderboard settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Champion whose mastery the leaderboard tracks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub champion_id: Option<u32>,
}

/// Quota throttling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_margin")]
    pub margin: u32,
    #[serde(default = "default_divisor")]
    pub divisor: u32,
    /// Calls allowed per window, keyed by window length in seconds.
    #[serde(default = "default_limits")]
    pub limits: BTreeMap<String, u32>,
}

fn default_margin() -> u32 {
    DEFAULT_MARGIN
}

fn default_divisor() -> u32 {
    DEFAULT_DIVISOR
}

fn default_limits() -> BTreeMap<String, u32> {
    BTreeMap::from([("1".to_string(), 20), ("120".to_string(), 100)])
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            divisor: default_divisor(),
            limits: default_limits(),
        }
    }
}

impl RateLimitSettings {
    /// Build the rate limiter config. Window keys that are not whole
    /// seconds are skipped.
    pub fn to_config(&self) -> RateLimitConfig {
        let limits = self.limits.iter().filter_map(|(window, limit)| {
            match window.trim().parse::<u64>() {
                Ok(secs) => Some((secs, *limit)),
                Err(_) => {
                    tracing::warn!("Ignoring rate limit window '{}': not a number of seconds", window);
                    None
                }
            }
        });
        RateLimitConfig::from_limits(limits, self.margin, self.divisor)
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Persisted leaderboard file.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default)]
    pub riot: RiotConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    /// File this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            request_timeout: default_request_timeout(),
            riot: RiotConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            rate_limit: RateLimitSettings::default(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers champlb config files in standard locations.
    pub async fn load() -> anyhow::Result<Self> {
        match prefer::load("champlb").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default_with_env()),
            },
            // No config file found, use defaults with env overrides
            Err(_) => Ok(Self::default_with_env()),
        }
    }

    /// Create a default config with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML, and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config.with_env_overrides())
    }

    fn parse(contents: &str, path: &Path) -> anyhow::Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let config = match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse JSON config: {}", e))?,
        };
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|s| !s.trim().is_empty()) {
            self.riot.api_key = Some(key);
        }
        self
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path relative to the config file's directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.base_dir() {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Absolute or config-relative path of the data file.
    pub fn data_path(&self) -> PathBuf {
        self.resolve_path(&self.data_file)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.riot
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.max(1))
    }
}
