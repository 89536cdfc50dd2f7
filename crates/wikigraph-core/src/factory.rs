//! Entity Factory
//!
//! Turns store nodes into typed entities and traversal results into
//! redirect-free [`PageSet`]s.
//!
//! Batch construction reads the [`TARGET_COLUMN`] of every row, classifies
//! the node, replaces redirects by their resolved target, and drops those
//! that do not resolve (cycles, dead ends). Everything else propagates.

use tracing::{debug, warn};

use crate::entity::{Article, Category, Entity, Loadable, PageSet, TypeTag};
use crate::error::{ConsistencyViolation, Result, WikiError};
use crate::redirect;
use crate::store::{
    run_query, GraphStore, NodeId, NodeRef, PageKind, Query, Row, Traversal, TARGET_COLUMN,
};

/// Builds entities against one store.
#[derive(Clone, Copy)]
pub struct PageFactory<'s> {
    store: &'s dyn GraphStore,
}

impl<'s> PageFactory<'s> {
    pub fn new(store: &'s dyn GraphStore) -> Self {
        Self { store }
    }

    /// Unloaded article for `node`, `None` if absent or not an article.
    pub fn create_article(node: Option<&NodeRef>) -> Option<Article> {
        Self::create(node)
    }

    /// Unloaded category for `node`, `None` if absent or not a category.
    pub fn create_category(node: Option<&NodeRef>) -> Option<Category> {
        Self::create(node)
    }

    /// Unloaded entity of whichever kind `node` carries.
    pub fn create_entity(node: Option<&NodeRef>) -> Option<Entity> {
        let node = node?;
        match TypeTag::classify(node)?.kind {
            PageKind::Article => Self::create_article(Some(node)).map(Entity::Article),
            PageKind::Category => Self::create_category(Some(node)).map(Entity::Category),
        }
    }

    fn create<T: Loadable>(node: Option<&NodeRef>) -> Option<T> {
        let node = node?;
        let tag = TypeTag::classify_as(node, T::KIND)?;
        Some(T::unloaded(node.id, tag.variant))
    }

    /// Articles reached by `traversal` from `origin`.
    pub fn articles(&self, origin: NodeId, traversal: Traversal) -> Result<PageSet<Article>> {
        self.collect(origin, traversal)
    }

    /// Categories reached by `traversal` from `origin`.
    pub fn categories(&self, origin: NodeId, traversal: Traversal) -> Result<PageSet<Category>> {
        self.collect(origin, traversal)
    }

    /// Run one traversal and return its rows; the session is released on return.
    pub(crate) fn traverse(&self, origin: NodeId, traversal: Traversal) -> Result<Vec<Row>> {
        Ok(run_query(self.store, &Query::Traverse { origin, traversal })?)
    }

    fn collect<T: Loadable>(&self, origin: NodeId, traversal: Traversal) -> Result<PageSet<T>> {
        let rows = self.traverse(origin, traversal)?;

        let mut pages = PageSet::new();
        for row in &rows {
            if let Some(page) = self.settle::<T>(row.node(TARGET_COLUMN)?)? {
                pages.insert(page);
            }
        }

        debug!(%origin, rows = rows.len(), pages = pages.len(), kind = %T::KIND, "Collected pages");
        Ok(pages)
    }

    /// Entity for a traversal target with redirects followed.
    ///
    /// `Ok(None)` when the node is a redirect that does not resolve.
    pub(crate) fn settle<T: Loadable>(&self, node: &NodeRef) -> Result<Option<T>> {
        let tag = TypeTag::classify_as(node, T::KIND).ok_or(
            ConsistencyViolation::Unclassifiable {
                node: node.id,
                expected: T::KIND,
            },
        )?;

        if !tag.is_redirect() {
            return Ok(Some(T::unloaded(node.id, tag.variant)));
        }

        match redirect::resolve::<T>(self.store, node.id) {
            Ok(Some(target)) => Ok(Some(target)),
            Ok(None) => {
                debug!(redirect = %node.id, "Dropping redirect caught in a cycle");
                Ok(None)
            }
            Err(WikiError::Consistency(ConsistencyViolation::DanglingRedirect { node: dead })) => {
                warn!(redirect = %node.id, dead_end = %dead, "Dropping dangling redirect");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
