//! Graph Façade
//!
//! [`Wikipedia`] holds the connection to a graph store and answers lookups by
//! title or Wikimedia identifier. Entities it returns are unloaded; their
//! getters and traversals take the store from [`Wikipedia::store`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::entity::{Article, Category, Entity};
use crate::error::{ConsistencyViolation, Result, WikiError};
use crate::factory::PageFactory;
use crate::store::{
    run_query, GraphStore, LookupKey, NodeRef, PageKind, Query, Row, SqliteGraphStore,
    StoreOptions, NODE_COLUMN,
};

/// Database opened by [`Wikipedia::connect`] when no location is given.
pub const DEFAULT_DATABASE: &str = "wikigraph.db";

/// Entry point to a graph-structured Wikipedia dataset.
#[derive(Default, Clone)]
pub struct Wikipedia {
    store: Option<Arc<dyn GraphStore>>,
}

impl Wikipedia {
    /// A façade with no store attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// A façade already connected to `store`.
    pub fn with_store(store: Arc<dyn GraphStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Open the SQLite store at `location` (or [`DEFAULT_DATABASE`]) read-only,
    /// replacing any current connection.
    pub fn connect(&mut self, location: Option<&Path>) -> Result<()> {
        let path = location
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE));
        let options = StoreOptions {
            read_only: true,
            ..StoreOptions::default()
        };
        self.connect_with(&path, options)
    }

    /// Open the SQLite store at `path` with explicit options.
    pub fn connect_with(&mut self, path: &Path, options: StoreOptions) -> Result<()> {
        let store = SqliteGraphStore::open(path, options)?;
        info!(path = %path.display(), "Connected to graph store");
        self.store = Some(Arc::new(store));
        Ok(())
    }

    /// Release the store. Entities created earlier stay usable with any
    /// store reference the caller still holds.
    pub fn disconnect(&mut self) {
        if self.store.take().is_some() {
            debug!("Disconnected from graph store");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    /// The connected store.
    pub fn store(&self) -> Result<&dyn GraphStore> {
        self.store.as_deref().ok_or(WikiError::NotConnected)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    fn lookup(
        &self,
        kind: Option<PageKind>,
        key: LookupKey,
        language: Option<&str>,
    ) -> Result<Vec<Row>> {
        let store = self.store()?;
        Ok(run_query(
            store,
            &Query::Lookup {
                kind,
                key,
                language: language.map(str::to_string),
            },
        )?)
    }

    /// The single node matching a title lookup, `None` when nothing matches.
    fn single(
        &self,
        kind: Option<PageKind>,
        title: &str,
        language: &str,
    ) -> Result<Option<NodeRef>> {
        let rows = self.lookup(kind, LookupKey::Title(title.to_string()), Some(language))?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => Ok(Some(row.node(NODE_COLUMN)?.clone())),
            _ => Err(ConsistencyViolation::AmbiguousLookup {
                kind: kind.map_or_else(|| "page".to_string(), |k| k.to_string()),
                title: title.to_string(),
                language: language.to_string(),
                matches: rows.len(),
            }
            .into()),
        }
    }

    /// The page of either kind titled `title` in the `language` edition.
    pub fn entity(&self, title: &str, language: &str) -> Result<Option<Entity>> {
        let node = self.single(None, title, language)?;
        Ok(PageFactory::create_entity(node.as_ref()))
    }

    /// The article titled `title` in the `language` edition.
    pub fn article(&self, title: &str, language: &str) -> Result<Option<Article>> {
        let node = self.single(Some(PageKind::Article), title, language)?;
        Ok(PageFactory::create_article(node.as_ref()))
    }

    /// The category titled `title` in the `language` edition.
    pub fn category(&self, title: &str, language: &str) -> Result<Option<Category>> {
        let node = self.single(Some(PageKind::Category), title, language)?;
        Ok(PageFactory::create_category(node.as_ref()))
    }

    /// The article with Wikimedia identifier `wiki_id` in the `language` edition.
    pub fn article_by_wiki_id(&self, wiki_id: &str, language: &str) -> Result<Option<Article>> {
        let rows = self.lookup(
            Some(PageKind::Article),
            LookupKey::WikiId(wiki_id.to_string()),
            Some(language),
        )?;
        match rows.as_slice() {
            [] => Ok(None),
            [row] => Ok(PageFactory::create_article(Some(row.node(NODE_COLUMN)?))),
            _ => Err(ConsistencyViolation::AmbiguousLookup {
                kind: "article".to_string(),
                title: format!("wikiid:{}", wiki_id),
                language: language.to_string(),
                matches: rows.len(),
            }
            .into()),
        }
    }

    /// Articles titled `title` across every language edition.
    pub fn articles_titled(&self, title: &str) -> Result<Vec<Article>> {
        self.articles_matching(LookupKey::Title(title.to_string()))
    }

    /// Articles with Wikimedia identifier `wiki_id` across every language edition.
    pub fn articles_with_wiki_id(&self, wiki_id: &str) -> Result<Vec<Article>> {
        self.articles_matching(LookupKey::WikiId(wiki_id.to_string()))
    }

    fn articles_matching(&self, key: LookupKey) -> Result<Vec<Article>> {
        let rows = self.lookup(Some(PageKind::Article), key, None)?;
        rows.iter()
            .map(|row| -> Result<Option<Article>> {
                Ok(PageFactory::create_article(Some(row.node(NODE_COLUMN)?)))
            })
            .filter_map(Result::transpose)
            .collect()
    }
}

impl std::fmt::Debug for Wikipedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wikipedia")
            .field("connected", &self.is_connected())
            .finish()
    }
}
