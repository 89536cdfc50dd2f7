//! Config command - View and manage configuration
//!
//! Provides commands for viewing and modifying WikiGraph configuration:
//! - List all configuration with sources
//! - Get specific configuration values
//! - Set configuration values (local or global)
//! - Create default configuration files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use wikigraph_config::{ConfigLoader, ConfigScope, WikigraphConfig};

use super::{config_loader, print_info, working_dir};
use crate::GlobalOptions;

/// Config management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// List all configuration values with their sources
    List(ListArgs),

    /// Get a specific configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Show configuration file paths
    Path(PathArgs),

    /// Write a default configuration file
    Init(InitArgs),
}

/// Arguments for the list command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Show only effective values (hide sources)
    #[arg(long)]
    effective: bool,
}

/// Arguments for the get command
#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Configuration key (e.g., "store.database")
    key: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the set command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., "lookup.default_language")
    key: String,

    /// Value to set
    value: String,

    /// Set in global config (~/.wikigraph/config.toml) instead of local
    #[arg(long)]
    global: bool,
}

/// Arguments for the path command
#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the init command
#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Create the global config (~/.wikigraph/config.toml) instead of local
    #[arg(long)]
    global: bool,
}

/// Configuration value with source information
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue {
    /// Configuration key
    pub key: String,
    /// Current value
    pub value: serde_json::Value,
    /// Source of this value (default, global, local)
    pub source: String,
}

/// Configuration paths
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPaths {
    /// Global config file path
    pub global: Option<PathBuf>,
    /// Local config file path
    pub local: PathBuf,
    /// Whether global config exists
    pub global_exists: bool,
    /// Whether local config exists
    pub local_exists: bool,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, global: &GlobalOptions) -> Result<()> {
    let root = working_dir()?;
    let mut loader = config_loader(global);

    match cmd {
        ConfigCommand::List(args) => execute_list(args, &loader, &root),
        ConfigCommand::Get(args) => execute_get(args, &loader, &root),
        ConfigCommand::Set(args) => execute_set(args, &mut loader, &root, global),
        ConfigCommand::Path(args) => execute_path(args, &loader, &root),
        ConfigCommand::Init(args) => execute_init(args, &loader, &root, global),
    }
}

fn execute_list(args: ListArgs, loader: &ConfigLoader, root: &Path) -> Result<()> {
    let default_config = WikigraphConfig::default();
    let global_config = loader.read(ConfigScope::Global, root)?.unwrap_or_default();
    let local_config = loader.read(ConfigScope::Local, root)?.unwrap_or_default();
    let effective = loader.load(root, None)?;

    if args.json {
        if args.effective {
            println!("{}", serde_json::to_string_pretty(&effective)?);
        } else {
            let values = collect_config_values(&default_config, &global_config, &local_config)?;
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
    } else {
        print_config_list(&default_config, &global_config, &local_config, loader, root);
    }

    Ok(())
}

fn execute_get(args: GetArgs, loader: &ConfigLoader, root: &Path) -> Result<()> {
    let config = loader.load(root, None)?;

    let value = get_config_value(&config, &args.key)
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", args.key))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        match value {
            serde_json::Value::String(s) => println!("{}", s),
            serde_json::Value::Bool(b) => println!("{}", b),
            serde_json::Value::Number(n) => println!("{}", n),
            serde_json::Value::Null => println!("null"),
            other => println!("{}", serde_json::to_string_pretty(&other)?),
        }
    }

    Ok(())
}

fn execute_set(
    args: SetArgs,
    loader: &ConfigLoader,
    root: &Path,
    global: &GlobalOptions,
) -> Result<()> {
    let scope = scope_of(args.global);

    // Start from the file being edited, not the merged view
    let mut config = if loader.path(scope, root).is_some_and(|p| p.exists()) {
        loader.read(scope, root)?.unwrap_or_default()
    } else {
        WikigraphConfig::default()
    };

    set_config_value(&mut config, &args.key, &args.value)
        .with_context(|| format!("Failed to set configuration key: {}", args.key))?;
    config
        .validate()
        .with_context(|| format!("Invalid value for {}: {}", args.key, args.value))?;

    loader.write(scope, root, &config)?;
    print_info(
        &format!("Set {} = {} in {} config", args.key, args.value, scope),
        global.quiet,
    );

    Ok(())
}

fn execute_path(args: PathArgs, loader: &ConfigLoader, root: &Path) -> Result<()> {
    let global_path = loader.path(ConfigScope::Global, root);
    let local_path = loader
        .path(ConfigScope::Local, root)
        .context("No local configuration path")?;

    let paths = ConfigPaths {
        global_exists: global_path.as_ref().is_some_and(|p| p.exists()),
        local_exists: local_path.exists(),
        global: global_path,
        local: local_path,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        println!("Configuration Paths");
        println!("===================\n");

        if let Some(ref gp) = paths.global {
            let status = if paths.global_exists {
                "exists"
            } else {
                "not found"
            };
            println!("Global: {} ({})", gp.display(), status);
        } else {
            println!("Global: not available (no home directory)");
        }

        let status = if paths.local_exists {
            "exists"
        } else {
            "not found"
        };
        println!("Local:  {} ({})", paths.local.display(), status);
    }

    Ok(())
}

fn execute_init(
    args: InitArgs,
    loader: &ConfigLoader,
    root: &Path,
    global: &GlobalOptions,
) -> Result<()> {
    let path = loader.init(scope_of(args.global), root)?;

    print_info(&format!("Configuration written to {}", path.display()), global.quiet);
    Ok(())
}

/// File targeted by `--global`.
fn scope_of(global: bool) -> ConfigScope {
    if global {
        ConfigScope::Global
    } else {
        ConfigScope::Local
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Get a configuration value by key path
fn get_config_value(config: &WikigraphConfig, key: &str) -> Option<serde_json::Value> {
    let json = serde_json::to_value(config).ok()?;

    let mut current = &json;
    for part in key.split('.') {
        current = current.get(part)?;
    }

    Some(current.clone())
}

/// Set a configuration value by key path
fn set_config_value(config: &mut WikigraphConfig, key: &str, value: &str) -> Result<()> {
    match key {
        // Store
        "store.database" => config.store.database = PathBuf::from(value),
        "store.max_idle_sessions" => config.store.max_idle_sessions = value.parse()?,
        "store.read_only" => config.store.read_only = value.parse()?,

        // Lookup
        "lookup.default_language" => config.lookup.default_language = value.to_string(),
        "lookup.crosslink_languages" => {
            config.lookup.crosslink_languages = value
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()
        }

        // Logging
        "logging.level" => config.logging.level = value.to_string(),
        "logging.format" => config.logging.format = value.parse()?,

        _ => anyhow::bail!("Unknown or read-only configuration key: {}", key),
    }

    Ok(())
}

/// Collect configuration values with source information
fn collect_config_values(
    default: &WikigraphConfig,
    global: &WikigraphConfig,
    local: &WikigraphConfig,
) -> Result<Vec<ConfigValue>> {
    let mut values = Vec::new();

    let default_json = serde_json::to_value(default)?;
    let global_json = serde_json::to_value(global)?;
    let local_json = serde_json::to_value(local)?;

    flatten_config("", &local_json, &global_json, &default_json, &mut values);

    Ok(values)
}

/// Recursively flatten config into key-value pairs with sources
fn flatten_config(
    prefix: &str,
    local: &serde_json::Value,
    global: &serde_json::Value,
    default: &serde_json::Value,
    values: &mut Vec<ConfigValue>,
) {
    match local {
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };

                let global_val = global.get(key).unwrap_or(&serde_json::Value::Null);
                let default_val = default.get(key).unwrap_or(&serde_json::Value::Null);

                flatten_config(&new_prefix, value, global_val, default_val, values);
            }
        }
        _ => {
            let (value, source) = if local != default {
                (local, "local")
            } else if global != default {
                (global, "global")
            } else {
                (default, "default")
            };

            values.push(ConfigValue {
                key: prefix.to_string(),
                value: value.clone(),
                source: source.to_string(),
            });
        }
    }
}

/// Print configuration in a human-readable format
fn print_config_list(
    default: &WikigraphConfig,
    global: &WikigraphConfig,
    local: &WikigraphConfig,
    loader: &ConfigLoader,
    root: &Path,
) {
    println!("WikiGraph Configuration");
    println!("=======================\n");

    for scope in ConfigScope::LAYERS {
        if let Some(path) = loader.path(scope, root) {
            let status = if path.exists() { "" } else { " (not found)" };
            let label = format!("{} config:", capitalize(&scope.to_string()));
            println!("{:<14} {}{}", label, path.display(), status);
        }
    }
    println!();

    println!("[store]");
    print_value(
        "database",
        &local.store.database,
        &global.store.database,
        &default.store.database,
    );
    print_value(
        "max_idle_sessions",
        &local.store.max_idle_sessions,
        &global.store.max_idle_sessions,
        &default.store.max_idle_sessions,
    );
    print_value(
        "read_only",
        &local.store.read_only,
        &global.store.read_only,
        &default.store.read_only,
    );

    println!("\n[lookup]");
    print_value(
        "default_language",
        &local.lookup.default_language,
        &global.lookup.default_language,
        &default.lookup.default_language,
    );
    print_value(
        "crosslink_languages",
        &local.lookup.crosslink_languages,
        &global.lookup.crosslink_languages,
        &default.lookup.crosslink_languages,
    );

    println!("\n[logging]");
    print_value(
        "level",
        &local.logging.level,
        &global.logging.level,
        &default.logging.level,
    );
    print_value(
        "format",
        &local.logging.format,
        &global.logging.format,
        &default.logging.format,
    );
}

/// Print a configuration value with its source
fn print_value<T: std::fmt::Debug + PartialEq>(key: &str, local: &T, global: &T, default: &T) {
    let (value, source) = if local != default {
        (local, " (local)")
    } else if global != default {
        (global, " (global)")
    } else {
        (default, "")
    };

    println!("  {} = {:?}{}", key, value, source);
}
