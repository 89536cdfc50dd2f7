//! Layered configuration files.
//!
//! Two files feed a [`WikigraphConfig`], read in [`ConfigScope::LAYERS`] order:
//! - global: `~/.wikigraph/config.toml`
//! - local: `.wikigraph/config.toml` under the working directory, or the
//!   file passed with `--config`
//!
//! CLI overrides are applied after both.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::{ConfigOverrides, LoggingConfig, LookupConfig, StoreConfig, WikigraphConfig};

const CONFIG_DIR: &str = ".wikigraph";
const CONFIG_FILE: &str = "config.toml";

/// The configuration file an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    Global,
    Local,
}

impl ConfigScope {
    /// Read order; later layers win.
    pub const LAYERS: [ConfigScope; 2] = [ConfigScope::Global, ConfigScope::Local];
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigScope::Global => write!(f, "global"),
            ConfigScope::Local => write!(f, "local"),
        }
    }
}

/// Resolves, reads and writes the configuration files.
///
/// The `Default` loader has no global scope; [`ConfigLoader::new`] finds it
/// under the home directory.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// `~/.wikigraph`, when a home directory is known
    global_dir: Option<PathBuf>,
    /// Replaces the local file
    explicit_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// A loader whose global scope lives under the user's home directory.
    pub fn new() -> Self {
        Self {
            global_dir: dirs::home_dir().map(|home| home.join(CONFIG_DIR)),
            explicit_file: None,
        }
    }

    /// A loader whose global scope lives in `dir`.
    pub fn with_global_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            global_dir: Some(dir.into()),
            explicit_file: None,
        }
    }

    /// Use `path` as the local scope. The file must exist when read.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// File behind `scope`; `None` for the global scope without a home directory.
    pub fn path(&self, scope: ConfigScope, root: &Path) -> Option<PathBuf> {
        match scope {
            ConfigScope::Global => self.global_dir.as_ref().map(|dir| dir.join(CONFIG_FILE)),
            ConfigScope::Local => Some(
                self.explicit_file
                    .clone()
                    .unwrap_or_else(|| root.join(CONFIG_DIR).join(CONFIG_FILE)),
            ),
        }
    }

    fn writable_path(&self, scope: ConfigScope, root: &Path) -> Result<PathBuf, ConfigError> {
        self.path(scope, root).ok_or(ConfigError::NoHomeDir)
    }

    /// Parse the file behind `scope`, `None` when there is no such file.
    ///
    /// An explicit `--config` file is read even when missing so the error
    /// names it.
    pub fn read(
        &self,
        scope: ConfigScope,
        root: &Path,
    ) -> Result<Option<WikigraphConfig>, ConfigError> {
        let Some(path) = self.path(scope, root) else {
            debug!("No home directory, skipping global config");
            return Ok(None);
        };

        let required = scope == ConfigScope::Local && self.explicit_file.is_some();
        if !required && !path.exists() {
            trace!(%scope, path = %path.display(), "No config file");
            return Ok(None);
        }

        debug!(%scope, path = %path.display(), "Reading config file");
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::read_file(&path, e))?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::parse_toml(&path, e))
    }

    /// Merge every layer for `root`, then apply `overrides`.
    pub fn load(
        &self,
        root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<WikigraphConfig, ConfigError> {
        let mut config = WikigraphConfig::default();
        for scope in ConfigScope::LAYERS {
            if let Some(layer) = self.read(scope, root)? {
                config = merge_configs(config, layer);
            }
        }

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
        }
        Ok(config)
    }

    /// Replace the file behind `scope` with `config`, creating its directory.
    pub fn write(
        &self,
        scope: ConfigScope,
        root: &Path,
        config: &WikigraphConfig,
    ) -> Result<PathBuf, ConfigError> {
        let path = self.writable_path(scope, root)?;
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&path, content).map_err(|e| ConfigError::write_file(&path, e))?;
        debug!(%scope, path = %path.display(), "Wrote config file");
        Ok(path)
    }

    /// Write the default configuration for `scope` unless its file exists.
    pub fn init(&self, scope: ConfigScope, root: &Path) -> Result<PathBuf, ConfigError> {
        let path = self.writable_path(scope, root)?;
        if path.exists() {
            return Ok(path);
        }
        self.write(scope, root, &WikigraphConfig::default())
    }
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// This performs a field-by-field merge, allowing partial configs.
fn merge_configs(base: WikigraphConfig, overlay: WikigraphConfig) -> WikigraphConfig {
    WikigraphConfig {
        store: merge_store(base.store, overlay.store),
        lookup: merge_lookup(base.lookup, overlay.lookup),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

/// Merge store config, overlay values override base.
fn merge_store(base: StoreConfig, overlay: StoreConfig) -> StoreConfig {
    let defaults = StoreConfig::default();
    StoreConfig {
        // Use overlay if it differs from default, otherwise keep base
        database: if overlay.database != defaults.database {
            overlay.database
        } else {
            base.database
        },
        max_idle_sessions: if overlay.max_idle_sessions != defaults.max_idle_sessions {
            overlay.max_idle_sessions
        } else {
            base.max_idle_sessions
        },
        read_only: if overlay.read_only != defaults.read_only {
            overlay.read_only
        } else {
            base.read_only
        },
    }
}

/// Merge lookup config.
fn merge_lookup(base: LookupConfig, overlay: LookupConfig) -> LookupConfig {
    LookupConfig {
        default_language: if overlay.default_language != "en" {
            overlay.default_language
        } else {
            base.default_language
        },
        // Overlay languages extend base languages
        crosslink_languages: {
            let mut languages = base.crosslink_languages;
            for language in overlay.crosslink_languages {
                if !languages.contains(&language) {
                    languages.push(language);
                }
            }
            languages
        },
    }
}

/// Merge logging config.
fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    LoggingConfig {
        level: if overlay.level != "info" {
            overlay.level
        } else {
            base.level
        },
        format: if overlay.format != crate::LogFormat::Text {
            overlay.format
        } else {
            base.format
        },
    }
}
