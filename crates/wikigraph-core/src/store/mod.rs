//! Graph Store Module
//!
//! The graph store is the collaborator that actually holds the dataset.
//! Everything above this module talks to it through two traits:
//! - [`GraphStore`] opens sessions
//! - [`StoreSession`] runs one [`Query`] and returns ordered [`Row`]s
//!
//! Sessions are released when dropped, so every exit path of an operation
//! (including `?` early returns) gives its session back.
//!
//! # Architecture
//!
//! ```text
//! GraphStore
//! ├── SqliteGraphStore (reference store, pooled rusqlite connections)
//! └── InstrumentedStore<S> (query/session counters around any store)
//!
//! Query
//! ├── Lookup   (title or wiki id → `node` column)
//! ├── Detail   (node id → one row of properties)
//! └── Traverse (node id + traversal shape → `target` column per row)
//! ```

pub mod instrumented;
pub mod schema;
pub mod sqlite;
pub mod value;

pub use instrumented::{InstrumentedStore, QueryStats};
pub use sqlite::{LinkRecord, PageRecord, SqliteGraphStore, StoreOptions, StoreStats};
pub use value::{
    NodeId, NodeRef, Row, Value, LABEL_ARTICLE, LABEL_CATEGORY, LABEL_DISAMBIGUATION,
    LABEL_REDIRECT,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Column holding the node returned by a lookup.
pub const NODE_COLUMN: &str = "node";

/// Column holding the node reached by a traversal.
pub const TARGET_COLUMN: &str = "target";

/// Link metadata columns returned by [`Traversal::Links`].
pub const RANK_COLUMN: &str = "rank";
pub const INTRO_COLUMN: &str = "intro";
pub const INFOBOX_COLUMN: &str = "infobox";
pub const OCCURRENCES_COLUMN: &str = "occurrences";

/// Errors raised by a graph store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: String, found: String },

    #[error("Store is opened read-only")]
    ReadOnly,

    #[error("Session already released")]
    SessionClosed,

    #[error("Column '{0}' missing from result row")]
    MissingColumn(String),

    #[error("Column '{column}' holds {found}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Column '{column}' holds {value}, which is out of range")]
    OutOfRange { column: String, value: i64 },
}

impl StoreError {
    pub(crate) fn column_type(column: &str, expected: &'static str, found: &Value) -> Self {
        Self::ColumnType {
            column: column.to_string(),
            expected,
            found: found.type_name(),
        }
    }
}

/// Base kind of a page node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageKind {
    Article,
    Category,
}

impl PageKind {
    /// The store label that marks this kind.
    pub fn label(&self) -> &'static str {
        match self {
            PageKind::Article => LABEL_ARTICLE,
            PageKind::Category => LABEL_CATEGORY,
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PageKind::Article => "article",
            PageKind::Category => "category",
        })
    }
}

/// Scalar page property that a detail query can fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Title,
    Language,
    WikiId,
    Parents,
    Outdegree,
    Indegree,
    Globe,
    Latitude,
    Longitude,
    SpatialType,
    Children,
    Size,
}

impl Property {
    /// Column name in result rows (and in the reference store's `nodes` table).
    pub fn column(&self) -> &'static str {
        match self {
            Property::Title => "title",
            Property::Language => "lang",
            Property::WikiId => "wikiid",
            Property::Parents => "parents",
            Property::Outdegree => "outdegree",
            Property::Indegree => "indegree",
            Property::Globe => "globe",
            Property::Latitude => "latitude",
            Property::Longitude => "longitude",
            Property::SpatialType => "spatial_type",
            Property::Children => "children",
            Property::Size => "size",
        }
    }
}

/// Key used by a lookup query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Title(String),
    WikiId(String),
}

/// Edge direction relative to the origin node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// origin → other
    #[default]
    Outgoing,
    /// other → origin
    Incoming,
}

/// Positional predicate on internal links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkFilter {
    #[default]
    Any,
    /// First occurrence rank `<= max`.
    MaxRank(u32),
    /// First occurrence text offset `<= max`.
    MaxOffset(u32),
    /// First occurrence inside the introduction.
    Intro,
    /// First occurrence inside the infobox.
    Infobox,
}

/// Shape of a traversal issued from an origin node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal {
    /// Article ↔ article internal links, with metadata columns.
    Links {
        direction: Direction,
        filter: LinkFilter,
    },
    /// Outgoing links flagged as disambiguation links.
    DisambiguationLinks,
    /// The single redirect edge leaving the origin, restricted to `kind`.
    RedirectTarget { kind: PageKind },
    /// Categories the origin belongs to.
    ParentCategories,
    /// Pages of `kind` that belong to the origin category.
    Members { kind: PageKind },
    /// Cross-language links to pages of `kind`; empty `languages` means any.
    CrossLinks {
        kind: PageKind,
        languages: Vec<String>,
    },
}

/// A parameterized query against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Nodes matching a key, optionally restricted by kind and language.
    /// Rows carry a [`NODE_COLUMN`].
    Lookup {
        kind: Option<PageKind>,
        key: LookupKey,
        language: Option<String>,
    },
    /// Properties of one node of the given kind.
    Detail {
        node: NodeId,
        kind: PageKind,
        properties: Vec<Property>,
    },
    /// Nodes reached from `origin`. Rows carry a [`TARGET_COLUMN`].
    Traverse { origin: NodeId, traversal: Traversal },
}

impl Query {
    /// Short name used in logs and consistency errors.
    pub fn name(&self) -> &'static str {
        match self {
            Query::Lookup { .. } => "lookup",
            Query::Detail { .. } => "detail",
            Query::Traverse { .. } => "traverse",
        }
    }
}

/// One logical unit of work against the store.
///
/// Dropping the session releases it.
pub trait StoreSession {
    fn run(&mut self, query: &Query) -> Result<Vec<Row>, StoreError>;
}

/// A graph store that hands out sessions.
pub trait GraphStore: Send + Sync {
    fn open_session(&self) -> Result<Box<dyn StoreSession + '_>, StoreError>;
}

/// Open a session, run one query and release the session before returning.
pub fn run_query(store: &dyn GraphStore, query: &Query) -> Result<Vec<Row>, StoreError> {
    let mut session = store.open_session()?;
    session.run(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_columns_unique() {
        let all = [
            Property::Title,
            Property::Language,
            Property::WikiId,
            Property::Parents,
            Property::Outdegree,
            Property::Indegree,
            Property::Globe,
            Property::Latitude,
            Property::Longitude,
            Property::SpatialType,
            Property::Children,
            Property::Size,
        ];
        let columns: std::collections::HashSet<_> = all.iter().map(|p| p.column()).collect();
        assert_eq!(columns.len(), all.len());
    }

    #[test]
    fn test_page_kind_labels() {
        assert_eq!(PageKind::Article.label(), LABEL_ARTICLE);
        assert_eq!(PageKind::Category.label(), LABEL_CATEGORY);
        assert_eq!(PageKind::Category.to_string(), "category");
    }

    #[test]
    fn test_query_names() {
        let lookup = Query::Lookup {
            kind: None,
            key: LookupKey::Title("Paris".into()),
            language: Some("en".into()),
        };
        assert_eq!(lookup.name(), "lookup");

        let traverse = Query::Traverse {
            origin: NodeId::new(1),
            traversal: Traversal::ParentCategories,
        };
        assert_eq!(traverse.name(), "traverse");
    }
}
