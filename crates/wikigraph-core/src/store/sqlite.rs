//! SQLite Reference Store
//!
//! [`SqliteGraphStore`] implements [`GraphStore`] over a single SQLite
//! database laid out by [`super::schema`]. Connections are pooled: a session
//! checks one out and hands it back when dropped, so nested operations (a
//! batch traversal resolving redirects, a disambiguation walk) each get their
//! own connection without reopening the database every time.
//!
//! The store also exposes record insertion so datasets and test fixtures can
//! be assembled without an external import tool.

use parking_lot::Mutex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tracing::{debug, trace};

use super::schema::{
    SCHEMA_CREATE_EDGES, SCHEMA_CREATE_INDEXES, SCHEMA_CREATE_LABELS, SCHEMA_CREATE_METADATA,
    SCHEMA_CREATE_NODES, STORE_SCHEMA_VERSION,
};
use super::value::{NodeId, NodeRef, Row, Value};
use super::value::{LABEL_ARTICLE, LABEL_CATEGORY, LABEL_DISAMBIGUATION, LABEL_REDIRECT};
use super::{
    Direction, GraphStore, LinkFilter, LookupKey, PageKind, Property, Query, StoreError,
    StoreSession, Traversal, INFOBOX_COLUMN, INTRO_COLUMN, NODE_COLUMN, OCCURRENCES_COLUMN,
    RANK_COLUMN, TARGET_COLUMN,
};

/// Distinguishes concurrently alive in-memory stores within one process.
static MEMORY_STORE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Options for opening a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Idle connections kept for reuse once their session is dropped.
    pub max_idle_sessions: usize,
    /// Reject record insertion and open connections with `query_only`.
    pub read_only: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_idle_sessions: 4,
            read_only: false,
        }
    }
}

/// Edge relation names as stored in `edges.relation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Link,
    RedirectTo,
    BelongTo,
    CrossLink,
}

impl Relation {
    fn as_str(&self) -> &'static str {
        match self {
            Relation::Link => "link",
            Relation::RedirectTo => "redirectTo",
            Relation::BelongTo => "belongTo",
            Relation::CrossLink => "crosslink",
        }
    }
}

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory(String),
}

/// A page node to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub kind: PageKind,
    pub redirect: bool,
    pub disambiguation: bool,
    pub title: String,
    pub language: String,
    pub wiki_id: String,
    pub parents: Option<u32>,
    pub outdegree: Option<u32>,
    pub indegree: Option<u32>,
    pub children: Option<u32>,
    pub size: Option<u32>,
    pub globe: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub spatial_type: Option<String>,
}

impl PageRecord {
    fn new(kind: PageKind, title: &str, language: &str) -> Self {
        Self {
            kind,
            redirect: false,
            disambiguation: false,
            title: title.to_string(),
            language: language.to_string(),
            wiki_id: String::new(),
            parents: Some(0),
            outdegree: None,
            indegree: None,
            children: None,
            size: None,
            globe: None,
            latitude: None,
            longitude: None,
            spatial_type: None,
        }
    }

    /// An article with zeroed counters.
    pub fn article(title: &str, language: &str) -> Self {
        Self {
            outdegree: Some(0),
            indegree: Some(0),
            ..Self::new(PageKind::Article, title, language)
        }
    }

    /// A category with zeroed counters.
    pub fn category(title: &str, language: &str) -> Self {
        Self {
            children: Some(0),
            size: Some(0),
            ..Self::new(PageKind::Category, title, language)
        }
    }

    pub fn redirect(mut self) -> Self {
        self.redirect = true;
        self
    }

    pub fn disambiguation(mut self) -> Self {
        self.disambiguation = true;
        self
    }

    pub fn with_wiki_id(mut self, wiki_id: impl Into<String>) -> Self {
        self.wiki_id = wiki_id.into();
        self
    }

    pub fn with_parents(mut self, parents: u32) -> Self {
        self.parents = Some(parents);
        self
    }

    pub fn with_degrees(mut self, outdegree: u32, indegree: u32) -> Self {
        self.outdegree = Some(outdegree);
        self.indegree = Some(indegree);
        self
    }

    pub fn with_category_counts(mut self, children: u32, size: u32) -> Self {
        self.children = Some(children);
        self.size = Some(size);
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_globe(mut self, globe: impl Into<String>) -> Self {
        self.globe = Some(globe.into());
        self
    }

    pub fn with_spatial_type(mut self, spatial_type: impl Into<String>) -> Self {
        self.spatial_type = Some(spatial_type.into());
        self
    }

    /// Labels this record is stored with.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = vec![self.kind.label()];
        if self.redirect {
            labels.push(LABEL_REDIRECT);
        }
        if self.disambiguation {
            labels.push(LABEL_DISAMBIGUATION);
        }
        labels
    }
}

/// Metadata of an internal link edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRecord {
    pub rank: u32,
    pub offset: u32,
    pub occurrences: u32,
    pub intro: bool,
    pub infobox: bool,
    pub disambiguation: bool,
}

impl Default for LinkRecord {
    fn default() -> Self {
        Self {
            rank: 1,
            offset: 0,
            occurrences: 1,
            intro: false,
            infobox: false,
            disambiguation: false,
        }
    }
}

impl LinkRecord {
    /// A link whose first occurrence has the given rank and text offset.
    pub fn at(rank: u32, offset: u32) -> Self {
        Self {
            rank,
            offset,
            ..Self::default()
        }
    }

    pub fn in_intro(mut self) -> Self {
        self.intro = true;
        self
    }

    pub fn in_infobox(mut self) -> Self {
        self.infobox = true;
        self
    }

    pub fn disambiguation(mut self) -> Self {
        self.disambiguation = true;
        self
    }

    pub fn with_occurrences(mut self, occurrences: u32) -> Self {
        self.occurrences = occurrences;
        self
    }
}

/// Statistics about a store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub node_count: usize,
    pub article_count: usize,
    pub category_count: usize,
    pub redirect_count: usize,
    pub disambiguation_count: usize,
    pub edge_count: usize,
    pub schema_version: Option<String>,
}

/// Pooled SQLite graph store
pub struct SqliteGraphStore {
    location: Location,
    options: StoreOptions,
    idle: Mutex<Vec<Connection>>,
    /// Keeps a shared in-memory database alive while pooled connections come and go.
    _anchor: Option<Mutex<Connection>>,
    sessions_opened: AtomicUsize,
    sessions_closed: AtomicUsize,
}

impl SqliteGraphStore {
    /// Create a new store database with schema (read-write).
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self {
            location: Location::File(path.to_path_buf()),
            options: StoreOptions::default(),
            idle: Mutex::new(Vec::new()),
            _anchor: None,
            sessions_opened: AtomicUsize::new(0),
            sessions_closed: AtomicUsize::new(0),
        };

        let conn = store.connect()?;
        Self::create_schema(&conn)?;
        store.release(conn);

        debug!(path = %path.display(), "Created graph store");
        Ok(store)
    }

    /// Open an existing store database.
    pub fn open(path: &Path, options: StoreOptions) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("graph store not found: {}", path.display()),
            )));
        }

        let store = Self {
            location: Location::File(path.to_path_buf()),
            options,
            idle: Mutex::new(Vec::new()),
            _anchor: None,
            sessions_opened: AtomicUsize::new(0),
            sessions_closed: AtomicUsize::new(0),
        };

        let conn = store.connect()?;
        let version = Self::read_metadata(&conn, "schema_version")?;
        store.release(conn);

        match version {
            Some(v) if v == STORE_SCHEMA_VERSION => {}
            other => {
                return Err(StoreError::SchemaVersionMismatch {
                    expected: STORE_SCHEMA_VERSION.to_string(),
                    found: other.unwrap_or_else(|| "none".to_string()),
                });
            }
        }

        debug!(
            path = %path.display(),
            read_only = options.read_only,
            "Opened graph store"
        );
        Ok(store)
    }

    /// Create a shared in-memory store (for tests and fixtures)
    pub fn in_memory() -> Result<Self, StoreError> {
        let n = MEMORY_STORE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let uri = format!("file:wikigraph-mem-{}?mode=memory&cache=shared", n);

        let mut store = Self {
            location: Location::Memory(uri),
            options: StoreOptions::default(),
            idle: Mutex::new(Vec::new()),
            _anchor: None,
            sessions_opened: AtomicUsize::new(0),
            sessions_closed: AtomicUsize::new(0),
        };

        let anchor = store.connect()?;
        Self::create_schema(&anchor)?;
        store._anchor = Some(Mutex::new(anchor));

        Ok(store)
    }

    fn create_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute(SCHEMA_CREATE_NODES, [])?;
        conn.execute(SCHEMA_CREATE_LABELS, [])?;
        conn.execute(SCHEMA_CREATE_EDGES, [])?;
        conn.execute(SCHEMA_CREATE_METADATA, [])?;
        conn.execute_batch(SCHEMA_CREATE_INDEXES)?;
        conn.execute(
            "INSERT OR REPLACE INTO store_metadata (key, value) VALUES ('schema_version', ?1)",
            [STORE_SCHEMA_VERSION],
        )?;
        Ok(())
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = match &self.location {
            Location::File(path) => {
                let conn = Connection::open_with_flags(path, flags)?;
                // WAL for concurrent readers on disk
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn
            }
            Location::Memory(uri) => Connection::open_with_flags(uri, flags)?,
        };

        conn.pragma_update(None, "cache_size", -64000)?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        if self.options.read_only {
            conn.pragma_update(None, "query_only", "ON")?;
        }

        trace!("Opened SQLite connection");
        Ok(conn)
    }

    fn checkout(&self) -> Result<Connection, StoreError> {
        let pooled = self.idle.lock().pop();
        match pooled {
            Some(conn) => Ok(conn),
            None => self.connect(),
        }
    }

    fn release(&self, conn: Connection) {
        let mut idle = self.idle.lock();
        if idle.len() < self.options.max_idle_sessions {
            idle.push(conn);
        }
    }

    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.checkout()?;
        let result = f(&conn);
        self.release(conn);
        result
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        if self.options.read_only {
            return Err(StoreError::ReadOnly);
        }
        Ok(())
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory(_) => None,
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Sessions opened and not yet dropped.
    pub fn active_sessions(&self) -> usize {
        self.sessions_opened
            .load(Ordering::SeqCst)
            .saturating_sub(self.sessions_closed.load(Ordering::SeqCst))
    }

    /// Connections waiting in the pool.
    pub fn idle_sessions(&self) -> usize {
        self.idle.lock().len()
    }

    // =========================================================================
    // Metadata Operations
    // =========================================================================

    fn read_metadata(conn: &Connection, key: &str) -> Result<Option<String>, StoreError> {
        let value = conn
            .query_row(
                "SELECT value FROM store_metadata WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Get a metadata value
    pub fn get_metadata(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_connection(|conn| Self::read_metadata(conn, key))
    }

    /// Set a metadata value
    pub fn set_metadata(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO store_metadata (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
            Ok(())
        })
    }

    // =========================================================================
    // Record Insertion
    // =========================================================================

    /// Insert a page node and its labels, returning the assigned identity.
    pub fn insert_page(&self, record: &PageRecord) -> Result<NodeId, StoreError> {
        self.ensure_writable()?;
        self.with_connection(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                r#"
                INSERT INTO nodes
                    (title, lang, wikiid, parents, outdegree, indegree, children, size,
                     globe, latitude, longitude, spatial_type)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
                params![
                    record.title,
                    record.language,
                    record.wiki_id,
                    record.parents,
                    record.outdegree,
                    record.indegree,
                    record.children,
                    record.size,
                    record.globe,
                    record.latitude,
                    record.longitude,
                    record.spatial_type,
                ],
            )?;
            let id = tx.last_insert_rowid();

            {
                let mut stmt =
                    tx.prepare("INSERT OR IGNORE INTO node_labels (node_id, label) VALUES (?1, ?2)")?;
                for label in record.labels() {
                    stmt.execute(params![id, label])?;
                }
            }

            tx.commit()?;
            trace!(id, title = %record.title, "Inserted page");
            Ok(NodeId::new(id))
        })
    }

    /// Insert an internal link `source → target`.
    pub fn insert_link(
        &self,
        source: NodeId,
        target: NodeId,
        link: LinkRecord,
    ) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.with_connection(|conn| {
            conn.execute(
                r#"
                INSERT OR REPLACE INTO edges
                    (source, target, relation, link_rank, text_offset, occurrences, intro, infobox, disambig)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    source.get(),
                    target.get(),
                    Relation::Link.as_str(),
                    link.rank,
                    link.offset,
                    link.occurrences,
                    link.intro,
                    link.infobox,
                    link.disambiguation,
                ],
            )?;
            Ok(())
        })
    }

    /// Insert the redirect edge of a redirect page.
    pub fn insert_redirect(&self, source: NodeId, target: NodeId) -> Result<(), StoreError> {
        self.insert_plain_edge(source, target, Relation::RedirectTo)
    }

    /// Record that `member` belongs to `category`.
    pub fn insert_membership(&self, member: NodeId, category: NodeId) -> Result<(), StoreError> {
        self.insert_plain_edge(member, category, Relation::BelongTo)
    }

    /// Insert a cross-language link `source → target`.
    pub fn insert_crosslink(&self, source: NodeId, target: NodeId) -> Result<(), StoreError> {
        self.insert_plain_edge(source, target, Relation::CrossLink)
    }

    fn insert_plain_edge(
        &self,
        source: NodeId,
        target: NodeId,
        relation: Relation,
    ) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.with_connection(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO edges (source, target, relation) VALUES (?1, ?2, ?3)",
                params![source.get(), target.get(), relation.as_str()],
            )?;
            Ok(())
        })
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Get store statistics
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        self.with_connection(|conn| {
            let count = |sql: &str| -> Result<usize, StoreError> {
                let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
                Ok(n as usize)
            };
            let labelled = |label: &str| -> Result<usize, StoreError> {
                let n: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM node_labels WHERE label = ?1",
                    [label],
                    |row| row.get(0),
                )?;
                Ok(n as usize)
            };

            Ok(StoreStats {
                node_count: count("SELECT COUNT(*) FROM nodes")?,
                article_count: labelled(LABEL_ARTICLE)?,
                category_count: labelled(LABEL_CATEGORY)?,
                redirect_count: labelled(LABEL_REDIRECT)?,
                disambiguation_count: labelled(LABEL_DISAMBIGUATION)?,
                edge_count: count("SELECT COUNT(*) FROM edges")?,
                schema_version: Self::read_metadata(conn, "schema_version")?,
            })
        })
    }
}

impl GraphStore for SqliteGraphStore {
    fn open_session(&self) -> Result<Box<dyn StoreSession + '_>, StoreError> {
        let conn = self.checkout()?;
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SqliteSession {
            store: self,
            conn: Some(conn),
        }))
    }
}

/// A session holding one pooled connection.
struct SqliteSession<'a> {
    store: &'a SqliteGraphStore,
    conn: Option<Connection>,
}

impl StoreSession for SqliteSession<'_> {
    fn run(&mut self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let conn = self.conn.as_ref().ok_or(StoreError::SessionClosed)?;
        trace!(query = query.name(), "Running query");
        match query {
            Query::Lookup {
                kind,
                key,
                language,
            } => run_lookup(conn, *kind, key, language.as_deref()),
            Query::Detail {
                node,
                kind,
                properties,
            } => run_detail(conn, *node, *kind, properties),
            Query::Traverse { origin, traversal } => run_traverse(conn, *origin, traversal),
        }
    }
}

impl Drop for SqliteSession<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.store.release(conn);
        }
        self.store.sessions_closed.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Query Translation
// =============================================================================

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) | ValueRef::Blob(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

/// `EXISTS` clause requiring `node_expr` to carry a label bound as the next parameter.
fn label_clause(node_expr: &str) -> String {
    format!(
        "EXISTS (SELECT 1 FROM node_labels l WHERE l.node_id = {} AND l.label = ?)",
        node_expr
    )
}

fn node_ref(conn: &Connection, id: i64) -> Result<NodeRef, StoreError> {
    let mut stmt = conn.prepare_cached("SELECT label FROM node_labels WHERE node_id = ?1")?;
    let labels = stmt
        .query_map([id], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(NodeRef::new(NodeId::new(id), labels))
}

fn run_lookup(
    conn: &Connection,
    kind: Option<PageKind>,
    key: &LookupKey,
    language: Option<&str>,
) -> Result<Vec<Row>, StoreError> {
    let (column, value) = match key {
        LookupKey::Title(title) => ("title", title),
        LookupKey::WikiId(id) => ("wikiid", id),
    };

    let mut sql = format!("SELECT n.id FROM nodes n WHERE n.{} = ?", column);
    let mut bound = vec![SqlValue::Text(value.clone())];

    if let Some(lang) = language {
        sql.push_str(" AND n.lang = ?");
        bound.push(SqlValue::Text(lang.to_string()));
    }
    if let Some(kind) = kind {
        sql.push_str(" AND ");
        sql.push_str(&label_clause("n.id"));
        bound.push(SqlValue::Text(kind.label().to_string()));
    }
    sql.push_str(" ORDER BY n.id");

    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map(params_from_iter(bound), |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    ids.into_iter()
        .map(|id| -> Result<Row, StoreError> {
            Ok(Row::new().with(NODE_COLUMN, node_ref(conn, id)?))
        })
        .collect()
}

fn run_detail(
    conn: &Connection,
    node: NodeId,
    kind: PageKind,
    properties: &[Property],
) -> Result<Vec<Row>, StoreError> {
    let mut select = vec!["n.id".to_string()];
    select.extend(properties.iter().map(|p| format!("n.{}", p.column())));

    let sql = format!(
        "SELECT {} FROM nodes n WHERE n.id = ? AND {}",
        select.join(", "),
        label_clause("n.id")
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![node.get(), kind.label()])?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut result = Row::new();
        for (i, property) in properties.iter().enumerate() {
            result.insert(property.column(), to_value(row.get_ref(i + 1)?));
        }
        out.push(result);
    }
    Ok(out)
}

/// Edge pattern a traversal compiles to.
struct EdgePattern {
    relation: Relation,
    direction: Direction,
    origin_label: Option<&'static str>,
    other_label: &'static str,
    with_metadata: bool,
}

fn run_traverse(
    conn: &Connection,
    origin: NodeId,
    traversal: &Traversal,
) -> Result<Vec<Row>, StoreError> {
    let (pattern, filter) = match traversal {
        Traversal::Links { direction, filter } => (
            EdgePattern {
                relation: Relation::Link,
                direction: *direction,
                origin_label: Some(LABEL_ARTICLE),
                other_label: LABEL_ARTICLE,
                with_metadata: true,
            },
            *filter,
        ),
        Traversal::DisambiguationLinks => (
            EdgePattern {
                relation: Relation::Link,
                direction: Direction::Outgoing,
                origin_label: Some(LABEL_DISAMBIGUATION),
                other_label: LABEL_ARTICLE,
                with_metadata: true,
            },
            LinkFilter::Any,
        ),
        Traversal::RedirectTarget { kind } => (
            EdgePattern {
                relation: Relation::RedirectTo,
                direction: Direction::Outgoing,
                origin_label: Some(LABEL_REDIRECT),
                other_label: kind.label(),
                with_metadata: false,
            },
            LinkFilter::Any,
        ),
        Traversal::ParentCategories => (
            EdgePattern {
                relation: Relation::BelongTo,
                direction: Direction::Outgoing,
                origin_label: None,
                other_label: LABEL_CATEGORY,
                with_metadata: false,
            },
            LinkFilter::Any,
        ),
        Traversal::Members { kind } => (
            EdgePattern {
                relation: Relation::BelongTo,
                direction: Direction::Incoming,
                origin_label: Some(LABEL_CATEGORY),
                other_label: kind.label(),
                with_metadata: false,
            },
            LinkFilter::Any,
        ),
        Traversal::CrossLinks { kind, .. } => (
            EdgePattern {
                relation: Relation::CrossLink,
                direction: Direction::Outgoing,
                origin_label: Some(kind.label()),
                other_label: kind.label(),
                with_metadata: false,
            },
            LinkFilter::Any,
        ),
    };

    let (origin_col, other_col) = match pattern.direction {
        Direction::Outgoing => ("e.source", "e.target"),
        Direction::Incoming => ("e.target", "e.source"),
    };

    let mut sql = format!(
        "SELECT {other}, e.link_rank, e.occurrences, e.intro, e.infobox \
         FROM edges e WHERE {origin} = ? AND e.relation = ? AND {other_label}",
        other = other_col,
        origin = origin_col,
        other_label = label_clause(other_col),
    );
    let mut bound = vec![
        SqlValue::Integer(origin.get()),
        SqlValue::Text(pattern.relation.as_str().to_string()),
        SqlValue::Text(pattern.other_label.to_string()),
    ];

    if let Some(label) = pattern.origin_label {
        sql.push_str(" AND ");
        sql.push_str(&label_clause(origin_col));
        bound.push(SqlValue::Text(label.to_string()));
    }

    match filter {
        LinkFilter::Any => {}
        LinkFilter::MaxRank(max) => {
            sql.push_str(" AND e.link_rank <= ?");
            bound.push(SqlValue::Integer(i64::from(max)));
        }
        LinkFilter::MaxOffset(max) => {
            sql.push_str(" AND e.text_offset <= ?");
            bound.push(SqlValue::Integer(i64::from(max)));
        }
        LinkFilter::Intro => sql.push_str(" AND COALESCE(e.intro, 0) != 0"),
        LinkFilter::Infobox => sql.push_str(" AND COALESCE(e.infobox, 0) != 0"),
    }

    if matches!(traversal, Traversal::DisambiguationLinks) {
        sql.push_str(" AND COALESCE(e.disambig, 0) != 0");
    }

    if let Traversal::CrossLinks { languages, .. } = traversal {
        if !languages.is_empty() {
            let placeholders = vec!["?"; languages.len()].join(", ");
            sql.push_str(&format!(
                " AND (SELECT t.lang FROM nodes t WHERE t.id = {}) IN ({})",
                other_col, placeholders
            ));
            bound.extend(languages.iter().map(|l| SqlValue::Text(l.clone())));
        }
    }

    sql.push_str(" ORDER BY e.id");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bound))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let other: i64 = row.get(0)?;
        let mut result = Row::new().with(TARGET_COLUMN, node_ref(conn, other)?);
        if pattern.with_metadata {
            result.insert(RANK_COLUMN, to_value(row.get_ref(1)?));
            result.insert(OCCURRENCES_COLUMN, to_value(row.get_ref(2)?));
            result.insert(INTRO_COLUMN, to_value(row.get_ref(3)?));
            result.insert(INFOBOX_COLUMN, to_value(row.get_ref(4)?));
        }
        out.push(result);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::run_query;

    fn lookup_title(title: &str, lang: &str) -> Query {
        Query::Lookup {
            kind: None,
            key: LookupKey::Title(title.to_string()),
            language: Some(lang.to_string()),
        }
    }

    fn traverse(origin: NodeId, traversal: Traversal) -> Query {
        Query::Traverse { origin, traversal }
    }

    fn targets(rows: &[Row]) -> Vec<NodeId> {
        rows.iter().map(|r| r.node(TARGET_COLUMN).unwrap().id).collect()
    }

    #[test]
    fn test_create_in_memory() {
        let store = SqliteGraphStore::in_memory().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.edge_count, 0);
        assert_eq!(stats.schema_version.as_deref(), Some(STORE_SCHEMA_VERSION));
        assert!(store.path().is_none());
    }

    #[test]
    fn test_in_memory_stores_are_isolated() {
        let a = SqliteGraphStore::in_memory().unwrap();
        let b = SqliteGraphStore::in_memory().unwrap();
        a.insert_page(&PageRecord::article("Paris", "en")).unwrap();
        assert_eq!(a.stats().unwrap().node_count, 1);
        assert_eq!(b.stats().unwrap().node_count, 0);
    }

    #[test]
    fn test_insert_and_lookup_page() {
        let store = SqliteGraphStore::in_memory().unwrap();
        let id = store
            .insert_page(&PageRecord::article("Paris", "en").with_wiki_id("22989"))
            .unwrap();
        store.insert_page(&PageRecord::article("Paris", "fr")).unwrap();

        let rows = run_query(&store, &lookup_title("Paris", "en")).unwrap();
        assert_eq!(rows.len(), 1);
        let node = rows[0].node(NODE_COLUMN).unwrap();
        assert_eq!(node.id, id);
        assert!(node.has_label(LABEL_ARTICLE));

        let by_wiki_id = Query::Lookup {
            kind: Some(PageKind::Article),
            key: LookupKey::WikiId("22989".to_string()),
            language: None,
        };
        assert_eq!(run_query(&store, &by_wiki_id).unwrap().len(), 1);
    }

    #[test]
    fn test_lookup_kind_filter() {
        let store = SqliteGraphStore::in_memory().unwrap();
        store.insert_page(&PageRecord::category("Paris", "en")).unwrap();

        let query = Query::Lookup {
            kind: Some(PageKind::Article),
            key: LookupKey::Title("Paris".to_string()),
            language: Some("en".to_string()),
        };
        assert!(run_query(&store, &query).unwrap().is_empty());
    }

    #[test]
    fn test_detail_returns_requested_columns() {
        let store = SqliteGraphStore::in_memory().unwrap();
        let id = store
            .insert_page(
                &PageRecord::article("Paris", "en")
                    .with_degrees(12, 40)
                    .with_coordinates(48.8566, 2.3522),
            )
            .unwrap();

        let query = Query::Detail {
            node: id,
            kind: PageKind::Article,
            properties: vec![Property::Title, Property::Outdegree, Property::Latitude, Property::Globe],
        };
        let rows = run_query(&store, &query).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("title").unwrap(), "Paris");
        assert_eq!(rows[0].count("outdegree").unwrap(), 12);
        assert_eq!(rows[0].opt_float("latitude").unwrap(), Some(48.8566));
        assert_eq!(rows[0].opt_text("globe").unwrap(), None);

        // Wrong kind: no rows
        let query = Query::Detail {
            node: id,
            kind: PageKind::Category,
            properties: vec![Property::Title],
        };
        assert!(run_query(&store, &query).unwrap().is_empty());
    }

    #[test]
    fn test_link_filters() {
        let store = SqliteGraphStore::in_memory().unwrap();
        let a = store.insert_page(&PageRecord::article("A", "en")).unwrap();
        let b = store.insert_page(&PageRecord::article("B", "en")).unwrap();
        let c = store.insert_page(&PageRecord::article("C", "en")).unwrap();
        let cat = store.insert_page(&PageRecord::category("K", "en")).unwrap();

        store.insert_link(a, b, LinkRecord::at(1, 10).in_intro()).unwrap();
        store.insert_link(a, c, LinkRecord::at(5, 900).in_infobox()).unwrap();
        // Links to categories are not article links
        store.insert_link(a, cat, LinkRecord::at(2, 20)).unwrap();

        let links = |filter| {
            let rows = run_query(
                &store,
                &traverse(
                    a,
                    Traversal::Links {
                        direction: Direction::Outgoing,
                        filter,
                    },
                ),
            )
            .unwrap();
            targets(&rows)
        };

        assert_eq!(links(LinkFilter::Any), vec![b, c]);
        assert_eq!(links(LinkFilter::MaxRank(3)), vec![b]);
        assert_eq!(links(LinkFilter::MaxOffset(1000)), vec![b, c]);
        assert_eq!(links(LinkFilter::Intro), vec![b]);
        assert_eq!(links(LinkFilter::Infobox), vec![c]);

        let incoming = run_query(
            &store,
            &traverse(
                c,
                Traversal::Links {
                    direction: Direction::Incoming,
                    filter: LinkFilter::Any,
                },
            ),
        )
        .unwrap();
        assert_eq!(targets(&incoming), vec![a]);
        assert_eq!(incoming[0].count(RANK_COLUMN).unwrap(), 5);
        assert!(incoming[0].flag(INFOBOX_COLUMN).unwrap());
        assert!(!incoming[0].flag(INTRO_COLUMN).unwrap());
    }

    #[test]
    fn test_redirect_and_membership_traversals() {
        let store = SqliteGraphStore::in_memory().unwrap();
        let r = store
            .insert_page(&PageRecord::article("Obama", "en").redirect())
            .unwrap();
        let t = store.insert_page(&PageRecord::article("Barack Obama", "en")).unwrap();
        let cat = store.insert_page(&PageRecord::category("Presidents", "en")).unwrap();
        store.insert_redirect(r, t).unwrap();
        store.insert_membership(t, cat).unwrap();

        let rows = run_query(
            &store,
            &traverse(r, Traversal::RedirectTarget { kind: PageKind::Article }),
        )
        .unwrap();
        assert_eq!(targets(&rows), vec![t]);

        // Only redirect nodes have a redirect target
        let rows = run_query(
            &store,
            &traverse(t, Traversal::RedirectTarget { kind: PageKind::Article }),
        )
        .unwrap();
        assert!(rows.is_empty());

        let parents = run_query(&store, &traverse(t, Traversal::ParentCategories)).unwrap();
        assert_eq!(targets(&parents), vec![cat]);

        let members = run_query(
            &store,
            &traverse(cat, Traversal::Members { kind: PageKind::Article }),
        )
        .unwrap();
        assert_eq!(targets(&members), vec![t]);
    }

    #[test]
    fn test_crosslink_language_filter() {
        let store = SqliteGraphStore::in_memory().unwrap();
        let en = store.insert_page(&PageRecord::article("Paris", "en")).unwrap();
        let fr = store.insert_page(&PageRecord::article("Paris", "fr")).unwrap();
        let de = store.insert_page(&PageRecord::article("Paris", "de")).unwrap();
        store.insert_crosslink(en, fr).unwrap();
        store.insert_crosslink(en, de).unwrap();

        let cross = |languages: Vec<String>| {
            let rows = run_query(
                &store,
                &traverse(
                    en,
                    Traversal::CrossLinks {
                        kind: PageKind::Article,
                        languages,
                    },
                ),
            )
            .unwrap();
            targets(&rows)
        };

        assert_eq!(cross(vec![]), vec![fr, de]);
        assert_eq!(cross(vec!["fr".to_string()]), vec![fr]);
        assert_eq!(cross(vec!["fr".to_string(), "de".to_string()]), vec![fr, de]);
        assert!(cross(vec!["it".to_string()]).is_empty());
    }

    #[test]
    fn test_sessions_return_to_pool() {
        let store = SqliteGraphStore::in_memory().unwrap();
        {
            let _s1 = store.open_session().unwrap();
            let _s2 = store.open_session().unwrap();
            assert_eq!(store.active_sessions(), 2);
        }
        assert_eq!(store.active_sessions(), 0);
        assert!(store.idle_sessions() >= 1);
        assert!(store.idle_sessions() <= store.options().max_idle_sessions);
    }

    #[test]
    fn test_create_and_reopen_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("wiki.db");

        {
            let store = SqliteGraphStore::create(&path).unwrap();
            store.insert_page(&PageRecord::article("Paris", "en")).unwrap();
        }

        let store = SqliteGraphStore::open(
            &path,
            StoreOptions {
                read_only: true,
                ..StoreOptions::default()
            },
        )
        .unwrap();
        assert_eq!(store.stats().unwrap().article_count, 1);
        assert!(matches!(
            store.insert_page(&PageRecord::article("Lyon", "en")),
            Err(StoreError::ReadOnly)
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SqliteGraphStore::open(&dir.path().join("absent.db"), StoreOptions::default());
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[test]
    fn test_open_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wiki.db");
        {
            let store = SqliteGraphStore::create(&path).unwrap();
            store.set_metadata("schema_version", "0.1").unwrap();
        }

        let result = SqliteGraphStore::open(&path, StoreOptions::default());
        assert!(matches!(
            result,
            Err(StoreError::SchemaVersionMismatch { ref found, .. }) if found == "0.1"
        ));
    }

    #[test]
    fn test_stats_counts_labels() {
        let store = SqliteGraphStore::in_memory().unwrap();
        let a = store.insert_page(&PageRecord::article("A", "en")).unwrap();
        let d = store
            .insert_page(&PageRecord::article("A (disambiguation)", "en").disambiguation())
            .unwrap();
        store
            .insert_page(&PageRecord::category("Old", "en").redirect())
            .unwrap();
        store
            .insert_link(d, a, LinkRecord::default().disambiguation())
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.article_count, 2);
        assert_eq!(stats.category_count, 1);
        assert_eq!(stats.redirect_count, 1);
        assert_eq!(stats.disambiguation_count, 1);
        assert_eq!(stats.edge_count, 1);
    }
}
