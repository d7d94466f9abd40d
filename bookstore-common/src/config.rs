//! Configuration loading for bookstore services
//!
//! Settings are resolved per key in priority order:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default
//!
//! Tiers 1 and 2 are collected by the binary (clap handles both) and handed
//! over as [`ConfigOverrides`]; this module merges them with the TOML file and
//! the compiled defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default cap on uploaded inventory files (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default length of each ranked list in a store report
pub const DEFAULT_REPORT_LIMIT: usize = 5;

/// Runtime mode
///
/// Development mode exposes internal error details in HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Development,
    #[default]
    Production,
}

impl RunMode {
    pub fn is_development(self) -> bool {
        self == RunMode::Development
    }
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RunMode::Development),
            "production" | "prod" => Ok(RunMode::Production),
            other => Err(Error::Config(format!(
                "Unknown run mode '{}' (expected 'development' or 'production')",
                other
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Development => write!(f, "development"),
            RunMode::Production => write!(f, "production"),
        }
    }
}

/// Bootstrap configuration loaded from TOML file
///
/// Every key is optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Directory used to stage uploaded files
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,

    #[serde(default)]
    pub max_upload_bytes: Option<usize>,

    /// Number of entries in each ranked report list
    #[serde(default)]
    pub report_limit: Option<usize>,

    #[serde(default)]
    pub mode: Option<RunMode>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through environment variables
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
    pub report_limit: Option<usize>,
    pub mode: Option<RunMode>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub report_limit: usize,
    pub mode: RunMode,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::resolve(ConfigOverrides::default(), TomlConfig::default())
    }
}

impl ServiceConfig {
    /// Merge overrides, TOML values and compiled defaults
    pub fn resolve(overrides: ConfigOverrides, toml: TomlConfig) -> Self {
        let report_limit = overrides
            .report_limit
            .or(toml.report_limit)
            .unwrap_or(DEFAULT_REPORT_LIMIT);
        if report_limit == 0 {
            warn!("report_limit = 0 is not allowed, using 1");
        }

        Self {
            database_path: overrides
                .database_path
                .or(toml.database_path)
                .unwrap_or_else(default_database_path),
            host: overrides
                .host
                .or(toml.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT),
            upload_dir: overrides
                .upload_dir
                .or(toml.upload_dir)
                .unwrap_or_else(std::env::temp_dir),
            max_upload_bytes: overrides
                .max_upload_bytes
                .or(toml.max_upload_bytes)
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            report_limit: report_limit.max(1),
            mode: overrides.mode.or(toml.mode).unwrap_or_default(),
            log_level: overrides.log_level.unwrap_or(toml.logging.level),
        }
    }

    /// `host:port` string for binding the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load the TOML config file
///
/// With an explicit path the file must exist and parse. Without one, the
/// platform config location is tried and a missing file yields defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        return read_toml_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => read_toml_config(&path),
        Some(path) => {
            warn!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            Ok(TomlConfig::default())
        }
        None => {
            warn!("Could not determine config directory, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config = toml::from_str::<TomlConfig>(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// `<config_dir>/bookstore/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bookstore").join("config.toml"))
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("bookstore"))
        .unwrap_or_else(|| PathBuf::from("./bookstore_data"))
        .join("bookstore.db")
}
