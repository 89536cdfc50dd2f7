//! Query and session counters around any [`GraphStore`].

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

use super::{GraphStore, Query, Row, StoreError, StoreSession};

/// Snapshot of the counters kept by an [`InstrumentedStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryStats {
    pub sessions_opened: usize,
    pub sessions_closed: usize,
    pub lookups: usize,
    pub details: usize,
    pub traversals: usize,
}

impl QueryStats {
    /// Total queries of every kind.
    pub fn queries(&self) -> usize {
        self.lookups + self.details + self.traversals
    }

    /// Sessions opened and not yet released.
    pub fn open_sessions(&self) -> usize {
        self.sessions_opened.saturating_sub(self.sessions_closed)
    }
}

#[derive(Debug, Default)]
struct Counters {
    sessions_opened: AtomicUsize,
    sessions_closed: AtomicUsize,
    lookups: AtomicUsize,
    details: AtomicUsize,
    traversals: AtomicUsize,
}

/// Decorator that counts sessions and queries issued against `S`.
#[derive(Debug)]
pub struct InstrumentedStore<S> {
    inner: S,
    counters: Counters,
}

impl<S: GraphStore> InstrumentedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            counters: Counters::default(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    pub fn stats(&self) -> QueryStats {
        let c = &self.counters;
        QueryStats {
            sessions_opened: c.sessions_opened.load(Ordering::SeqCst),
            sessions_closed: c.sessions_closed.load(Ordering::SeqCst),
            lookups: c.lookups.load(Ordering::SeqCst),
            details: c.details.load(Ordering::SeqCst),
            traversals: c.traversals.load(Ordering::SeqCst),
        }
    }

    /// Zero every counter. Sessions alive across a reset are still counted
    /// as closed when dropped.
    pub fn reset(&self) {
        let c = &self.counters;
        for counter in [
            &c.sessions_opened,
            &c.sessions_closed,
            &c.lookups,
            &c.details,
            &c.traversals,
        ] {
            counter.store(0, Ordering::SeqCst);
        }
    }
}

impl<S: GraphStore> GraphStore for InstrumentedStore<S> {
    fn open_session(&self) -> Result<Box<dyn StoreSession + '_>, StoreError> {
        let inner = self.inner.open_session()?;
        let opened = self.counters.sessions_opened.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(opened, "Session opened");
        Ok(Box::new(InstrumentedSession {
            inner,
            counters: &self.counters,
        }))
    }
}

struct InstrumentedSession<'a> {
    inner: Box<dyn StoreSession + 'a>,
    counters: &'a Counters,
}

impl StoreSession for InstrumentedSession<'_> {
    fn run(&mut self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let counter = match query {
            Query::Lookup { .. } => &self.counters.lookups,
            Query::Detail { .. } => &self.counters.details,
            Query::Traverse { .. } => &self.counters.traversals,
        };
        counter.fetch_add(1, Ordering::SeqCst);

        let rows = self.inner.run(query)?;
        trace!(query = ?query, rows = rows.len(), "Query completed");
        Ok(rows)
    }
}

impl Drop for InstrumentedSession<'_> {
    fn drop(&mut self) {
        self.counters.sessions_closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{run_query, LookupKey, NodeId, PageRecord, SqliteGraphStore, Traversal};

    #[test]
    fn test_counts_queries_by_kind() {
        let store = InstrumentedStore::new(SqliteGraphStore::in_memory().unwrap());
        let id = store
            .inner()
            .insert_page(&PageRecord::article("Paris", "en"))
            .unwrap();

        run_query(
            &store,
            &Query::Lookup {
                kind: None,
                key: LookupKey::Title("Paris".into()),
                language: Some("en".into()),
            },
        )
        .unwrap();
        run_query(
            &store,
            &Query::Traverse {
                origin: id,
                traversal: Traversal::ParentCategories,
            },
        )
        .unwrap();

        let stats = store.stats();
        assert_eq!(stats.lookups, 1);
        assert_eq!(stats.traversals, 1);
        assert_eq!(stats.details, 0);
        assert_eq!(stats.queries(), 2);
        assert_eq!(stats.sessions_opened, 2);
        assert_eq!(stats.open_sessions(), 0);
    }

    #[test]
    fn test_sessions_released() {
        let store = InstrumentedStore::new(SqliteGraphStore::in_memory().unwrap());
        {
            let _session = store.open_session().unwrap();
            assert_eq!(store.stats().open_sessions(), 1);
        }
        assert_eq!(store.stats().open_sessions(), 0);

        // A query on a missing node still releases its session
        let rows = run_query(
            &store,
            &Query::Traverse {
                origin: NodeId::new(404),
                traversal: Traversal::ParentCategories,
            },
        )
        .unwrap();
        assert!(rows.is_empty());
        assert_eq!(store.stats().open_sessions(), 0);
    }

    #[test]
    fn test_reset() {
        let store = InstrumentedStore::new(SqliteGraphStore::in_memory().unwrap());
        drop(store.open_session().unwrap());
        store.reset();
        assert_eq!(store.stats(), QueryStats::default());
    }
}
