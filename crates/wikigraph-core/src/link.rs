//! Immutable link values between pages.

use crate::entity::{Entity, Page};
use crate::error::Result;
use crate::store::{NodeId, Row, INFOBOX_COLUMN, INTRO_COLUMN, OCCURRENCES_COLUMN, RANK_COLUMN};

/// A wiki link from one article to another within the same edition.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalLink {
    source: Entity,
    target: Entity,
    rank: u32,
    infobox: bool,
    intro: bool,
    occurrences: u32,
}

impl InternalLink {
    pub(crate) fn from_row(source: Entity, target: Entity, row: &Row) -> Result<Self> {
        Ok(Self {
            source,
            target,
            rank: row.positive(RANK_COLUMN)?,
            infobox: row.flag(INFOBOX_COLUMN)?,
            intro: row.flag(INTRO_COLUMN)?,
            occurrences: row.positive(OCCURRENCES_COLUMN)?,
        })
    }

    pub fn source(&self) -> &Entity {
        &self.source
    }

    pub fn target(&self) -> &Entity {
        &self.target
    }

    /// 1-based rank of the first occurrence among the source's links.
    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// First occurrence is inside the infobox.
    pub fn infobox(&self) -> bool {
        self.infobox
    }

    /// First occurrence is inside the introduction.
    pub fn intro(&self) -> bool {
        self.intro
    }

    /// How many times the link appears in the source text.
    pub fn occurrences(&self) -> u32 {
        self.occurrences
    }
}

/// A link between the same subject in two language editions.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossLink {
    source: Entity,
    target: Entity,
}

impl CrossLink {
    pub(crate) fn new(source: Entity, target: Entity) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> &Entity {
        &self.source
    }

    pub fn target(&self) -> &Entity {
        &self.target
    }
}

/// Either kind of link.
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    Internal(InternalLink),
    Cross(CrossLink),
}

impl Link {
    pub fn source(&self) -> &Entity {
        match self {
            Link::Internal(link) => link.source(),
            Link::Cross(link) => link.source(),
        }
    }

    pub fn target(&self) -> &Entity {
        match self {
            Link::Internal(link) => link.target(),
            Link::Cross(link) => link.target(),
        }
    }

    /// `(source, target)` identities.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.source().id(), self.target().id())
    }
}

impl From<InternalLink> for Link {
    fn from(link: InternalLink) -> Self {
        Link::Internal(link)
    }
}

impl From<CrossLink> for Link {
    fn from(link: CrossLink) -> Self {
        Link::Cross(link)
    }
}
