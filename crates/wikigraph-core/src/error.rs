//! Error types for entity access.
//!
//! A lookup that matches nothing is not an error (`Ok(None)`). Everything
//! here is either a store failure, a broken dataset, or misuse of the API.

use thiserror::Error;

use crate::store::{NodeId, PageKind, StoreError};

/// The dataset contradicts an assumption the entity layer relies on.
///
/// These are never defaulted away: the caller sees them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyViolation {
    #[error("{kind} {node} vanished from the store")]
    NodeVanished { node: NodeId, kind: PageKind },

    #[error("{query} query for {node} returned {rows} rows, expected exactly one")]
    UnexpectedRowCount {
        query: &'static str,
        node: NodeId,
        rows: usize,
    },

    #[error("redirect {node} has no redirect target")]
    DanglingRedirect { node: NodeId },

    #[error("{matches} {kind} nodes titled '{title}' in '{language}'")]
    AmbiguousLookup {
        kind: String,
        title: String,
        language: String,
        matches: usize,
    },

    #[error("node {node} cannot be classified as {expected}")]
    Unclassifiable { node: NodeId, expected: PageKind },

    #[error("article {node} has a latitude but no longitude")]
    PartialSpatialGroup { node: NodeId },
}

/// Errors raised by entity operations.
#[derive(Debug, Error)]
pub enum WikiError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Inconsistent dataset: {0}")]
    Consistency(#[from] ConsistencyViolation),

    #[error("Not connected to a graph store")]
    NotConnected,

    #[error("{0} is not a redirect")]
    NotARedirect(NodeId),

    #[error("{0} is not a disambiguation article")]
    NotADisambiguation(NodeId),

    #[error("{kind} {node} has no '{attribute}' attribute")]
    MissingAttribute {
        node: NodeId,
        kind: PageKind,
        attribute: &'static str,
    },
}

impl WikiError {
    /// True for errors caused by the dataset rather than the backend or the caller.
    pub fn is_consistency(&self) -> bool {
        matches!(self, WikiError::Consistency(_))
    }
}

/// Result alias for entity operations.
pub type Result<T, E = WikiError> = std::result::Result<T, E>;
