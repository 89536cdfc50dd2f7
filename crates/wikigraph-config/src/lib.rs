//! WikiGraph Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.wikigraph/config.toml`
//! - Local config: `.wikigraph/config.toml` (in the working directory)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::{ConfigLoader, ConfigScope};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Log levels accepted by `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration for WikiGraph.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WikigraphConfig {
    /// Graph store configuration
    pub store: StoreConfig,

    /// Lookup defaults
    pub lookup: LookupConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Graph store configuration.
///
/// # Example TOML
///
/// ```toml
/// [store]
/// database = "/data/enwiki.db"
/// max_idle_sessions = 8
/// read_only = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database holding the graph (relative paths resolve against
    /// the working directory)
    pub database: PathBuf,

    /// Idle connections kept in the session pool
    pub max_idle_sessions: usize,

    /// Open the store read-only
    pub read_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("wikigraph.db"),
            max_idle_sessions: 4,
            read_only: true,
        }
    }
}

/// Lookup defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Language edition used when a command does not name one
    pub default_language: String,

    /// Editions reported by cross-link commands when none are given
    /// (empty means every edition)
    pub crosslink_languages: Vec<String>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            crosslink_languages: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::invalid_value(
                "logging.format",
                format!("unknown format '{}', expected text or json", s),
            )),
        }
    }
}

/// CLI overrides for configuration values.
///
/// These take highest precedence in the merge order.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override database path
    pub database: Option<PathBuf>,

    /// Override read-only mode
    pub read_only: Option<bool>,

    /// Override default language
    pub default_language: Option<String>,

    /// Override log level
    pub log_level: Option<String>,

    /// Override log format
    pub log_format: Option<LogFormat>,
}

impl WikigraphConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref database) = overrides.database {
            self.store.database = database.clone();
        }

        if let Some(read_only) = overrides.read_only {
            self.store.read_only = read_only;
        }

        if let Some(ref language) = overrides.default_language {
            self.lookup.default_language = language.clone();
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }

        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.database.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value(
                "store.database",
                "must not be empty",
            ));
        }

        if self.store.max_idle_sessions == 0 {
            return Err(ConfigError::invalid_value(
                "store.max_idle_sessions",
                "must be at least 1",
            ));
        }

        if self.lookup.default_language.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "lookup.default_language",
                "must not be empty",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!(
                    "unknown level '{}', expected one of {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Resolve the database path against `base` when it is relative.
    pub fn database_path(&self, base: &Path) -> PathBuf {
        if self.store.database.is_absolute() {
            self.store.database.clone()
        } else {
            base.join(&self.store.database)
        }
    }
}
