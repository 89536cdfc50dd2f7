//! Redirect Resolution
//!
//! A redirect page points at exactly one page of its own kind, which may
//! itself be a redirect. Resolution follows single hops from a fixed origin
//! until it reaches a non-redirect page:
//! - non-redirect reached → `Some(target)`
//! - a redirect seen before (the origin or any page on the way) → `None`
//! - a redirect without an outgoing redirect edge → `DanglingRedirect`
//!
//! Articles and categories share the walk.

use std::collections::BTreeSet;
use tracing::debug;

use crate::entity::{Article, Category, Loadable, TypeTag};
use crate::error::{ConsistencyViolation, Result};
use crate::store::{run_query, GraphStore, NodeId, PageKind, Query, Traversal, TARGET_COLUMN};

/// Resolve the redirect article `origin` to its final target.
pub fn resolve_article(store: &dyn GraphStore, origin: NodeId) -> Result<Option<Article>> {
    resolve(store, origin)
}

/// Resolve the redirect category `origin` to its final target.
pub fn resolve_category(store: &dyn GraphStore, origin: NodeId) -> Result<Option<Category>> {
    resolve(store, origin)
}

pub(crate) fn resolve<T: Loadable>(store: &dyn GraphStore, origin: NodeId) -> Result<Option<T>> {
    Ok(walk(store, origin, T::KIND)?.map(|(id, tag)| T::unloaded(id, tag.variant)))
}

fn walk(
    store: &dyn GraphStore,
    origin: NodeId,
    kind: PageKind,
) -> Result<Option<(NodeId, TypeTag)>> {
    let mut visited = BTreeSet::from([origin]);
    let mut current = origin;

    loop {
        let rows = run_query(
            store,
            &Query::Traverse {
                origin: current,
                traversal: Traversal::RedirectTarget { kind },
            },
        )?;

        let target = match rows.as_slice() {
            [row] => row.node(TARGET_COLUMN)?.clone(),
            [] => return Err(ConsistencyViolation::DanglingRedirect { node: current }.into()),
            _ => {
                return Err(ConsistencyViolation::UnexpectedRowCount {
                    query: "redirect",
                    node: current,
                    rows: rows.len(),
                }
                .into())
            }
        };

        let tag = TypeTag::classify_as(&target, kind).ok_or(
            ConsistencyViolation::Unclassifiable {
                node: target.id,
                expected: kind,
            },
        )?;

        if !tag.is_redirect() {
            debug!(%origin, target = %target.id, hops = visited.len(), "Resolved redirect");
            return Ok(Some((target.id, tag)));
        }

        if !visited.insert(target.id) {
            debug!(%origin, repeated = %target.id, "Redirect cycle");
            return Ok(None);
        }
        current = target.id;
    }
}
