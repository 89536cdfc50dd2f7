//! CLI command implementations
//!
//! This module contains all WikiGraph CLI command implementations and the
//! helpers they share: configuration loading, opening the graph store and
//! printing pages.

pub mod config;
pub mod links;
pub mod page;
pub mod redirect;
pub mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use wikigraph_config::{ConfigLoader, WikigraphConfig};
use wikigraph_core::{
    Article, Category, GraphStore, InstrumentedStore, Page, SqliteGraphStore, StoreOptions,
    Wikipedia,
};

use crate::GlobalOptions;

/// Resolve the working directory configuration is looked up from.
pub fn working_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to get current directory")
}

/// Create a loader honouring `--config`.
pub fn config_loader(global: &GlobalOptions) -> ConfigLoader {
    let loader = ConfigLoader::new();
    match global.config {
        Some(ref path) => loader.with_config_file(path),
        None => loader,
    }
}

/// Load and validate configuration: global → local (or `--config`) → CLI overrides.
pub fn load_config(global: &GlobalOptions) -> Result<WikigraphConfig> {
    let root = working_dir()?;
    let loader = config_loader(global);

    let overrides = global.to_config_overrides();
    let config = loader
        .load(&root, Some(&overrides))
        .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

/// An open graph store together with the façade over it.
pub struct OpenGraph {
    wiki: Wikipedia,
    store: Arc<InstrumentedStore<SqliteGraphStore>>,
    language: String,
    verbose: bool,
}

impl OpenGraph {
    /// Open the configured database.
    pub fn open(global: &GlobalOptions, config: &WikigraphConfig) -> Result<Self> {
        let path = config.database_path(&working_dir()?);
        let options = StoreOptions {
            max_idle_sessions: config.store.max_idle_sessions,
            read_only: config.store.read_only,
        };

        let store = SqliteGraphStore::open(&path, options)
            .with_context(|| format!("Failed to open graph database {}", path.display()))?;
        debug!(path = %path.display(), "Opened graph database");

        let store = Arc::new(InstrumentedStore::new(store));
        Ok(Self {
            wiki: Wikipedia::with_store(store.clone()),
            store,
            language: config.lookup.default_language.clone(),
            verbose: global.verbose,
        })
    }

    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    pub fn sqlite(&self) -> &SqliteGraphStore {
        self.store.inner()
    }

    /// The article titled `title`, failing when there is none.
    pub fn article(&self, title: &str) -> Result<Article> {
        self.wiki
            .article(title, &self.language)
            .with_context(|| format!("Failed to look up article '{}'", title))?
            .with_context(|| format!("No article titled '{}' in {}", title, self.language))
    }

    /// The category titled `title`, failing when there is none.
    pub fn category(&self, title: &str) -> Result<Category> {
        self.wiki
            .category(title, &self.language)
            .with_context(|| format!("Failed to look up category '{}'", title))?
            .with_context(|| format!("No category titled '{}' in {}", title, self.language))
    }
}

impl Drop for OpenGraph {
    fn drop(&mut self) {
        if self.verbose {
            let stats = self.store.stats();
            info!(
                lookups = stats.lookups,
                details = stats.details,
                traversals = stats.traversals,
                sessions = stats.sessions_opened,
                "Query summary"
            );
        }
    }
}

/// One page as printed by the commands.
#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub id: i64,
    pub kind: String,
    pub title: String,
    pub language: String,
}

impl PageSummary {
    pub fn of_article(article: &mut Article, store: &dyn GraphStore) -> Result<Self> {
        Ok(Self {
            id: article.id().get(),
            kind: article.tag().to_string(),
            title: article.title(store)?.to_string(),
            language: article.language(store)?.to_string(),
        })
    }

    pub fn of_category(category: &mut Category, store: &dyn GraphStore) -> Result<Self> {
        Ok(Self {
            id: category.id().get(),
            kind: category.tag().to_string(),
            title: category.title(store)?.to_string(),
            language: category.language(store)?.to_string(),
        })
    }
}

/// Summaries of every article in `articles`, in identity order.
pub fn summarize_articles(
    articles: impl IntoIterator<Item = Article>,
    store: &dyn GraphStore,
) -> Result<Vec<PageSummary>> {
    articles
        .into_iter()
        .map(|mut article| PageSummary::of_article(&mut article, store))
        .collect()
}

/// Summaries of every category in `categories`, in identity order.
pub fn summarize_categories(
    categories: impl IntoIterator<Item = Category>,
    store: &dyn GraphStore,
) -> Result<Vec<PageSummary>> {
    categories
        .into_iter()
        .map(|mut category| PageSummary::of_category(&mut category, store))
        .collect()
}

/// Print pages as JSON or as one line each.
pub fn print_pages(pages: &[PageSummary], json: bool, quiet: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(pages)?);
        return Ok(());
    }

    for page in pages {
        println!("{}", format_page(page));
    }
    print_info(&format!("{} page(s)", pages.len()), quiet);
    Ok(())
}

/// One-line rendering of a page.
pub fn format_page(page: &PageSummary) -> String {
    format!("{:>8}  {} [{}]", format!("#{}", page.id), page.title, page.language)
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}
