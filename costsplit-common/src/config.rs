//! Configuration loading and config file resolution
//!
//! The TOML file is optional and every field has a built-in default:
//!
//! ```toml
//! [validation]
//! max_total_percentage = 100.0
//! epsilon = 0.0001
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::validator::ValidationPolicy;
use crate::{Error, Result};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "COSTSPLIT_CONFIG";

/// Configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Limits for overlap validation
    #[serde(default)]
    pub validation: ValidationPolicy,

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
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Reject limits that would make every set pass or fail
    pub fn check(&self) -> Result<()> {
        let policy = &self.validation;
        if !policy.max_total_percentage.is_finite() || policy.max_total_percentage <= 0.0 {
            return Err(Error::Config(format!(
                "validation.max_total_percentage must be positive, got {}",
                policy.max_total_percentage
            )));
        }
        if !policy.epsilon.is_finite() || policy.epsilon < 0.0 {
            return Err(Error::Config(format!(
                "validation.epsilon must not be negative, got {}",
                policy.epsilon
            )));
        }
        Ok(())
    }
}

/// Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path given on the command line
    Argument(PathBuf),
    /// Path named by [`CONFIG_ENV_VAR`]
    Environment(PathBuf),
    /// Per-user config file that exists on disk
    UserFile(PathBuf),
    /// No file; built-in defaults
    Defaults,
}

impl ConfigSource {
    /// File the configuration was read from, `None` for defaults
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Argument(path) | ConfigSource::Environment(path) | ConfigSource::UserFile(path) => {
                Some(path.as_path())
            }
            ConfigSource::Defaults => None,
        }
    }

    /// Log which source won.
    ///
    /// Configuration is loaded before the subscriber exists, so callers log
    /// this once tracing is installed.
    pub fn log(&self) {
        match self {
            ConfigSource::Argument(path) => {
                info!("Configuration from command line: {}", path.display())
            }
            ConfigSource::Environment(path) => {
                info!("Configuration from {}: {}", CONFIG_ENV_VAR, path.display())
            }
            ConfigSource::UserFile(path) => {
                info!("Configuration from user config file: {}", path.display())
            }
            ConfigSource::Defaults => {
                warn!("No configuration file found, using built-in defaults")
            }
        }
    }
}

/// Config file resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Per-user config file, if it exists
/// 4. Built-in defaults (fallback)
pub fn resolve_config_source(cli_arg: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::Argument(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Environment(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config file
    if let Some(path) = default_config_path() {
        if path.exists() {
            return ConfigSource::UserFile(path);
        }
    }

    // Priority 4: Built-in defaults
    ConfigSource::Defaults
}

/// Resolve and load configuration, returning where it came from.
///
/// A file named explicitly (argument or environment) must exist. Without
/// one, a missing per-user file falls back to defaults.
pub fn load_config(cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let source = resolve_config_source(cli_arg);
    let config = match source.path() {
        Some(path) => load_config_file(path)?,
        None => TomlConfig::default(),
    };
    Ok((config, source))
}

/// Load and check one TOML config file
pub fn load_config_file(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;

    config.check()?;
    Ok(config)
}

/// Per-user config file location, e.g. `~/.config/costsplit/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("costsplit").join("config.toml"))
}
