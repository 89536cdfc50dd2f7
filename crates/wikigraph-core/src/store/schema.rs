//! SQLite Schema Definitions for the Reference Graph Store
//!
//! A store is a single SQLite database holding page nodes, their labels and
//! the typed edges between them.

/// Schema version for store databases
pub const STORE_SCHEMA_VERSION: &str = "1.0";

/// SQL to create the nodes table
///
/// Stores the scalar properties of every page. Kind-specific columns
/// (outdegree/indegree for articles, children/size for categories) are
/// nullable so both kinds share one table.
pub const SCHEMA_CREATE_NODES: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    -- Store-assigned identity
    id INTEGER PRIMARY KEY,

    -- Page properties
    title TEXT NOT NULL,
    lang TEXT NOT NULL,
    wikiid TEXT NOT NULL,
    parents INTEGER,

    -- Article properties
    outdegree INTEGER,
    indegree INTEGER,
    globe TEXT,
    latitude REAL,
    longitude REAL,
    spatial_type TEXT,

    -- Category properties
    children INTEGER,
    size INTEGER
)
"#;

/// SQL to create the labels table
///
/// One row per (node, label): Article, Category, Redirect, Disambiguation.
pub const SCHEMA_CREATE_LABELS: &str = r#"
CREATE TABLE IF NOT EXISTS node_labels (
    node_id INTEGER NOT NULL,
    label TEXT NOT NULL,
    PRIMARY KEY (node_id, label)
)
"#;

/// SQL to create the edges table
///
/// `relation` is one of link, redirectTo, belongTo, crosslink. The positional
/// columns are only meaningful for link edges.
pub const SCHEMA_CREATE_EDGES: &str = r#"
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,

    source INTEGER NOT NULL,
    target INTEGER NOT NULL,
    relation TEXT NOT NULL,

    -- Link metadata
    link_rank INTEGER,
    text_offset INTEGER,
    occurrences INTEGER,
    intro INTEGER,
    infobox INTEGER,
    disambig INTEGER,

    UNIQUE(source, target, relation)
)
"#;

/// SQL to create indexes for efficient queries
pub const SCHEMA_CREATE_INDEXES: &str = r#"
-- Title lookups are always scoped by language
CREATE INDEX IF NOT EXISTS idx_nodes_title_lang ON nodes(title, lang);

-- Identifier lookups
CREATE INDEX IF NOT EXISTS idx_nodes_wikiid ON nodes(wikiid);

-- Label filtering
CREATE INDEX IF NOT EXISTS idx_labels_label ON node_labels(label);

-- Outgoing and incoming traversals
CREATE INDEX IF NOT EXISTS idx_edges_source_relation ON edges(source, relation);
CREATE INDEX IF NOT EXISTS idx_edges_target_relation ON edges(target, relation);
"#;

/// SQL to create the metadata table
pub const SCHEMA_CREATE_METADATA: &str = r#"
CREATE TABLE IF NOT EXISTS store_metadata (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)
"#;
