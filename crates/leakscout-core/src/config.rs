//! Configuration management for leakscout.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/leakscout/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Database settings
    pub database: DatabaseConfig,
    /// GitLab API settings
    pub gitlab: GitlabConfig,
    /// Scanning behavior settings
    pub scanning: ScanningConfig,
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
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `LEAKSCOUT_DATABASE_PATH`: Override the SQLite database path
    /// - `LEAKSCOUT_GITLAB_BASE_URL`: Override the GitLab API base URL
    /// - `LEAKSCOUT_RULES_PER_BATCH`: Override rules-per-batch (SearchNum)
    /// - `LEAKSCOUT_SCAN_INTERVAL_SECS`: Override the sleep between scan cycles
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("LEAKSCOUT_DATABASE_PATH") {
            tracing::debug!("Override database.path from env: {}", val);
            config.database.path = val;
        }

        if let Ok(val) = std::env::var("LEAKSCOUT_GITLAB_BASE_URL") {
            tracing::debug!("Override gitlab.base_url from env: {}", val);
            config.gitlab.base_url = val;
        }

        if let Ok(val) = std::env::var("LEAKSCOUT_RULES_PER_BATCH") {
            if let Ok(n) = val.parse() {
                tracing::debug!("Override scanning.rules_per_batch from env: {}", n);
                config.scanning.rules_per_batch = n;
            }
        }

        if let Ok(val) = std::env::var("LEAKSCOUT_SCAN_INTERVAL_SECS") {
            if let Ok(secs) = val.parse() {
                tracing::debug!("Override scanning.scan_interval_secs from env: {}", secs);
                config.scanning.scan_interval_secs = secs;
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
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

    /// Validate configuration values that the scanner depends on.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for a zero batch size.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scanning.rules_per_batch == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.rules_per_batch".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/leakscout/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("io", "leakscout", "leakscout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/leakscout`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("io", "leakscout", "leakscout").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "leakscout.db".to_string(),
        }
    }
}

/// GitLab API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitlabConfig {
    /// Base URL of the GitLab instance
    pub base_url: String,
}

impl Default for GitlabConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gitlab.com".to_string(),
        }
    }
}

/// Scanning behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Number of rules searched concurrently per batch (the rate-limit unit)
    pub rules_per_batch: usize,
    /// Sleep between full scan cycles, in seconds
    pub scan_interval_secs: u64,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            rules_per_batch: 5,
            scan_interval_secs: 1800,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.path, "leakscout.db");
        assert_eq!(config.gitlab.base_url, "https://gitlab.com");
        assert_eq!(config.scanning.rules_per_batch, 5);
        assert_eq!(config.scanning.scan_interval_secs, 1800);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[gitlab]"));
        assert!(toml_str.contains("[scanning]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.gitlab.base_url, config.gitlab.base_url);
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.database.path = "/var/lib/leakscout/scan.db".to_string();
        config.scanning.rules_per_batch = 2;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded_contents = fs::read_to_string(&config_path).expect("read config file");
        let loaded: AppConfig = toml::from_str(&loaded_contents).expect("parse loaded config");

        assert_eq!(loaded.database.path, "/var/lib/leakscout/scan.db");
        assert_eq!(loaded.scanning.rules_per_batch, 2);
    }

    #[test]
    fn test_partial_config() {
        // Partial TOML configs fill the rest from defaults
        let toml_str = r#"
[scanning]
rules_per_batch = 3
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.scanning.rules_per_batch, 3);
        assert_eq!(config.scanning.scan_interval_secs, 1800);
        assert_eq!(config.gitlab.base_url, "https://gitlab.com");
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config = AppConfig::default();
        config.scanning.rules_per_batch = 0;
        assert!(config.validate().is_err());

        config.scanning.rules_per_batch = 1;
        assert!(config.validate().is_ok());
    }
}
