//! Configuration management for SEOLens.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/seolens/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Page fetch settings
    pub fetch: FetchSettings,
    /// Search-index fallback settings
    pub fallback: FallbackConfig,
    /// Per-owner scan rate limit
    pub rate_limit: RateLimitConfig,
    /// Whole-scan settings
    pub scan: ScanConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, using defaults if it is missing.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `SEOLENS_BIND_ADDR`: Override the server listen address
    /// - `SEOLENS_DATABASE_PATH`: Override the SQLite database path
    /// - `SEOLENS_FETCH_TIMEOUT_SECS`: Override the per-request fetch timeout
    /// - `SERPAPI_KEY`: Credential for the search-index fallback
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides on top of the current values.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("SEOLENS_BIND_ADDR") {
            tracing::debug!("Override server.bind_addr from env: {}", val);
            self.server.bind_addr = val;
        }

        if let Ok(val) = std::env::var("SEOLENS_DATABASE_PATH") {
            tracing::debug!("Override server.database_path from env: {}", val);
            self.server.database_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("SEOLENS_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.fetch.timeout_secs = secs;
                tracing::debug!("Override fetch.timeout_secs from env: {}", secs);
            }
        }

        if let Ok(key) = std::env::var("SERPAPI_KEY") {
            if !key.trim().is_empty() {
                self.fallback.api_key = Some(key);
                tracing::debug!("Search-index fallback credential loaded from env");
            }
        }
    }

    /// Reject values that would make the scan pipeline misbehave.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.fetch.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch.max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch.timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rate_limit.window_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist. The fallback
    /// credential is never written.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/seolens/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("dev", "seolens", "seolens").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/seolens`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("dev", "seolens", "seolens").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, `host:port`
    pub bind_addr: String,
    /// SQLite database file (`:memory:` for an ephemeral store)
    pub database_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_path: PathBuf::from("seolens.db"),
        }
    }
}

/// Page fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// User agent sent with every page request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Total attempts when the target answers 429
    pub max_attempts: u32,
    /// Fixed wait between 429 retries in milliseconds
    pub backoff_ms: u64,
}

impl FetchSettings {
    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Wait between 429 retries.
    #[must_use]
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; SEOLensBot/1.0; +https://seolens.dev/bot)"
                .to_string(),
            timeout_secs: 10,
            max_attempts: 3,
            backoff_ms: 2000,
        }
    }
}

/// Search-index fallback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Search endpoint
    pub base_url: String,
    /// Timeout for the single fallback call in seconds
    pub timeout_secs: u64,
    /// API credential (loaded from `SERPAPI_KEY`, never written to disk)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            base_url: "https://serpapi.com/search".to_string(),
            timeout_secs: 10,
            api_key: None,
        }
    }
}

/// Per-owner scan rate limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Scans allowed per window
    pub scan_limit: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            scan_limit: 10,
            window_secs: 60,
        }
    }
}

/// Whole-scan settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Overall deadline for one scan request in seconds
    pub deadline_secs: u64,
}

impl ScanConfig {
    /// Overall deadline for one scan request.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { deadline_secs: 45 }
    }
}
