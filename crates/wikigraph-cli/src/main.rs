//! WikiGraph CLI - Explore a graph-structured Wikipedia dataset
//!
//! A command-line interface for looking up articles and categories,
//! following redirects, expanding disambiguation pages and walking links.
//!
//! # Usage
//!
//! ```bash
//! # Show an article
//! wikigraph article "Barack Obama"
//!
//! # Top-ranked outgoing links
//! wikigraph links "Barack Obama" --max-rank 3
//!
//! # Resolve a redirect
//! wikigraph redirect "Obama"
//!
//! # Readings of a disambiguation page
//! wikigraph interpretations "Washington"
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wikigraph_config::{ConfigOverrides, LogFormat, LoggingConfig, WikigraphConfig};

mod commands;

/// WikiGraph - Typed access to a graph-structured Wikipedia dataset
#[derive(Parser, Debug)]
#[command(name = "wikigraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Graph database to open
    #[arg(long, short = 'd', global = true, env = "WIKIGRAPH_DATABASE")]
    database: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, short = 'c', global = true, env = "WIKIGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Language edition for lookups (defaults to lookup.default_language)
    #[arg(long, short = 'l', global = true)]
    language: Option<String>,

    /// Log output format (text, json)
    #[arg(long, global = true, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

/// Parse log format from string
fn parse_log_format(s: &str) -> Result<LogFormat, String> {
    s.parse()
        .map_err(|e: wikigraph_config::ConfigError| e.to_string())
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database: self.database.clone(),
            default_language: self.language.clone(),
            log_format: self.log_format,
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show an article and its attributes
    Article(commands::page::ArticleArgs),

    /// Show a category, its members or subcategories
    Category(commands::page::CategoryArgs),

    /// List the internal links of an article
    Links(commands::links::LinksArgs),

    /// List the categories an article belongs to
    Categories(commands::links::CategoriesArgs),

    /// List the same subject in other language editions
    Crosslinks(commands::links::CrosslinksArgs),

    /// Resolve a redirect to its final target
    Redirect(commands::redirect::RedirectArgs),

    /// Expand a disambiguation page into its readings
    Interpretations(commands::redirect::InterpretationsArgs),

    /// Show store statistics and effective configuration
    Status(commands::status::StatusArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over the configured level; `--verbose` and `--quiet`
/// win over both.
fn init_logging(global: &GlobalOptions, logging: &LoggingConfig) -> Result<()> {
    let filter = if global.quiet {
        EnvFilter::new("error")
    } else if global.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match logging.format {
        LogFormat::Text => builder.with_ansi(true).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))
}

/// Load configuration for a command and install logging from it.
fn prepare(global: &GlobalOptions) -> Result<WikigraphConfig> {
    let config = commands::load_config(global)?;
    init_logging(global, &config.logging)?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = &cli.global;

    match cli.command {
        Commands::Article(args) => commands::page::execute_article(args, global, &prepare(global)?),
        Commands::Category(args) => {
            commands::page::execute_category(args, global, &prepare(global)?)
        }
        Commands::Links(args) => commands::links::execute_links(args, global, &prepare(global)?),
        Commands::Categories(args) => {
            commands::links::execute_categories(args, global, &prepare(global)?)
        }
        Commands::Crosslinks(args) => {
            commands::links::execute_crosslinks(args, global, &prepare(global)?)
        }
        Commands::Redirect(args) => {
            commands::redirect::execute_redirect(args, global, &prepare(global)?)
        }
        Commands::Interpretations(args) => {
            commands::redirect::execute_interpretations(args, global, &prepare(global)?)
        }
        Commands::Status(args) => commands::status::execute(args, global, &prepare(global)?),
        // Runs without loading the stored configuration so a broken file can be repaired
        Commands::Config(cmd) => {
            let logging = LoggingConfig {
                format: global.log_format.unwrap_or_default(),
                ..LoggingConfig::default()
            };
            init_logging(global, &logging)?;
            commands::config::execute(cmd, global)
        }
    }
}
