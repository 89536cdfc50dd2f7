//! Shared page state: identity, load state and the attribute group common to
//! articles and categories.

use tracing::debug;

use crate::error::{ConsistencyViolation, Result, WikiError};
use crate::store::{run_query, GraphStore, NodeId, PageKind, Property, Query, Row};

use super::{TypeTag, Variant};

/// Whether an entity's attributes have been fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loaded,
}

/// Attributes shared by every page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageAttributes {
    pub(crate) title: Option<String>,
    pub(crate) language: Option<String>,
    pub(crate) wiki_id: Option<String>,
    pub(crate) parents: Option<u32>,
}

impl PageAttributes {
    pub(crate) const PROPERTIES: [Property; 4] = [
        Property::Title,
        Property::Language,
        Property::WikiId,
        Property::Parents,
    ];

    pub(crate) fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            title: Some(row.text(Property::Title.column())?.to_string()),
            language: Some(row.text(Property::Language.column())?.to_string()),
            wiki_id: Some(row.text(Property::WikiId.column())?.to_string()),
            parents: row.opt_count(Property::Parents.column())?,
        })
    }
}

/// Anything with a store identity and a type tag.
pub trait Page {
    fn id(&self) -> NodeId;
    fn tag(&self) -> TypeTag;
}

/// Lazy-load state machine shared by [`super::Article`] and [`super::Category`].
///
/// `ensure_loaded` is the only place a detail query is issued.
pub(crate) trait Loadable: Page + Sized {
    const KIND: PageKind;

    /// Properties fetched by the detail query.
    fn properties() -> Vec<Property>;

    /// A fresh, unloaded entity.
    fn unloaded(id: NodeId, variant: Variant) -> Self;

    fn load_state(&self) -> LoadState;

    /// Overwrite every attribute from a detail row and flip to `Loaded`.
    fn populate(&mut self, row: &Row) -> Result<()>;

    fn ensure_loaded(&mut self, store: &dyn GraphStore) -> Result<()> {
        if self.load_state() == LoadState::Loaded {
            return Ok(());
        }

        let node = self.id();
        debug!(%node, kind = %Self::KIND, "Loading attributes");

        let rows = run_query(
            store,
            &Query::Detail {
                node,
                kind: Self::KIND,
                properties: Self::properties(),
            },
        )?;

        match rows.as_slice() {
            [row] => self.populate(row),
            [] => Err(ConsistencyViolation::NodeVanished {
                node,
                kind: Self::KIND,
            }
            .into()),
            _ => Err(ConsistencyViolation::UnexpectedRowCount {
                query: "detail",
                node,
                rows: rows.len(),
            }
            .into()),
        }
    }
}

/// Unwrap an attribute that a loaded entity must carry.
pub(crate) fn required<T>(
    value: Option<T>,
    node: NodeId,
    kind: PageKind,
    attribute: &'static str,
) -> Result<T> {
    value.ok_or(WikiError::MissingAttribute {
        node,
        kind,
        attribute,
    })
}
