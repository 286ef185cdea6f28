//! Configuration management for skh.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::numbering::{ReferenceClock, DEFAULT_UTC_OFFSET_HOURS};
use crate::service::settings::DEFAULT_MAX_LOGO_BYTES;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "skh";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "skh.db";

/// Default uploads directory name, inside the data directory.
const UPLOADS_DIR_NAME: &str = "uploads";

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "SKH_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SKH_`, sections split on `__`,
///    e.g. `SKH_SERVER__PORT=9000`)
/// 2. TOML config file at `~/.config/skh/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Upload configuration.
    pub uploads: UploadsConfig,
    /// Locale configuration.
    pub locale: LocaleConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Open the dashboard in a browser once the server is listening.
    pub open_browser: bool,
    /// Worker threads. 0 uses one per CPU core.
    pub workers: usize,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/skh/skh.db`
    pub database_path: Option<PathBuf>,
    /// Directory uploaded logos are written to.
    /// Defaults to `~/.local/share/skh/uploads`
    pub uploads_dir: Option<PathBuf>,
    /// How long a writer waits for the database lock, in milliseconds.
    pub busy_timeout_ms: u64,
}

/// Upload limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Largest accepted logo in bytes.
    pub max_logo_bytes: usize,
}

/// Locale configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Offset from UTC in whole hours used for letter dates and statistics.
    pub utc_offset_hours: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            open_browser: true,
            workers: 0,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            uploads_dir: None,
            busy_timeout_ms: 5_000,
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_logo_bytes: DEFAULT_MAX_LOGO_BYTES,
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        let config = Self::figment(&config_file).extract::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if !(-12..=14).contains(&self.locale.utc_offset_hours) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "locale.utc_offset_hours ({}) must be between -12 and 14",
                    self.locale.utc_offset_hours
                ),
            });
        }

        if self.uploads.max_logo_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "uploads.max_logo_bytes must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the uploads directory, resolving defaults if not set.
    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.storage
            .uploads_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(UPLOADS_DIR_NAME))
    }

    /// Get the busy timeout as a Duration.
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.busy_timeout_ms)
    }

    /// Build the reference clock for the configured offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is not a valid UTC offset.
    pub fn clock(&self) -> Result<ReferenceClock> {
        ReferenceClock::from_hours(self.locale.utc_offset_hours)
    }

    /// The URL the dashboard is reachable at.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }
}
