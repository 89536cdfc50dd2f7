//! Typed Page Entities
//!
//! Pages come in two kinds, each with a fixed set of variants:
//! - Article: plain, redirect or disambiguation
//! - Category: plain or redirect
//!
//! The pair is a [`TypeTag`], computed once from the node's labels when the
//! entity is created and never re-derived. Attributes are loaded lazily on
//! first access through a single detail query.
//!
//! # Architecture
//!
//! ```text
//! NodeRef (id + labels)
//!     │  TypeTag::classify
//!     ▼
//! Entity ──┬── Article  (PageAttributes + degrees + Spatial)
//!          └── Category (PageAttributes + children + size)
//!                  │
//!                  ▼  first getter
//!           Query::Detail → LoadState::Loaded
//! ```

pub mod article;
pub mod category;
pub mod page;
pub mod set;

pub use article::{Article, Spatial};
pub use category::Category;
pub use page::{LoadState, Page, PageAttributes};
pub use set::PageSet;

pub(crate) use page::Loadable;

use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Result;
use crate::store::{
    GraphStore, NodeId, NodeRef, PageKind, LABEL_ARTICLE, LABEL_CATEGORY, LABEL_DISAMBIGUATION,
    LABEL_REDIRECT,
};

/// Variant within a page kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Variant {
    Plain,
    Redirect,
    /// Articles only.
    Disambiguation,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Plain => "plain",
            Variant::Redirect => "redirect",
            Variant::Disambiguation => "disambiguation",
        })
    }
}

/// Immutable classification of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeTag {
    pub kind: PageKind,
    pub variant: Variant,
}

impl TypeTag {
    pub const fn new(kind: PageKind, variant: Variant) -> Self {
        Self { kind, variant }
    }

    /// Classify a node from its labels.
    ///
    /// The `Article` label wins over `Category`; within articles `Redirect`
    /// wins over `Disambiguation`. Nodes with neither base label are not
    /// pages and yield `None`.
    pub fn classify(node: &NodeRef) -> Option<Self> {
        if node.has_label(LABEL_ARTICLE) {
            Self::classify_as(node, PageKind::Article)
        } else if node.has_label(LABEL_CATEGORY) {
            Self::classify_as(node, PageKind::Category)
        } else {
            None
        }
    }

    /// Classify a node within the hierarchy of `kind`, `None` if the node
    /// lacks that kind's label.
    pub fn classify_as(node: &NodeRef, kind: PageKind) -> Option<Self> {
        if !node.has_label(kind.label()) {
            return None;
        }

        let variant = if node.has_label(LABEL_REDIRECT) {
            Variant::Redirect
        } else if kind == PageKind::Article && node.has_label(LABEL_DISAMBIGUATION) {
            Variant::Disambiguation
        } else {
            Variant::Plain
        };

        Some(Self::new(kind, variant))
    }

    pub fn is_redirect(&self) -> bool {
        self.variant == Variant::Redirect
    }

    pub fn is_disambiguation(&self) -> bool {
        self.variant == Variant::Disambiguation
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant {
            Variant::Plain => write!(f, "{}", self.kind),
            variant => write!(f, "{} {}", variant, self.kind),
        }
    }
}

/// Either kind of page.
#[derive(Debug, Clone)]
pub enum Entity {
    Article(Article),
    Category(Category),
}

impl Entity {
    pub fn kind(&self) -> PageKind {
        match self {
            Entity::Article(_) => PageKind::Article,
            Entity::Category(_) => PageKind::Category,
        }
    }

    pub fn as_article(&self) -> Option<&Article> {
        match self {
            Entity::Article(article) => Some(article),
            Entity::Category(_) => None,
        }
    }

    pub fn as_category(&self) -> Option<&Category> {
        match self {
            Entity::Category(category) => Some(category),
            Entity::Article(_) => None,
        }
    }

    pub fn into_article(self) -> Option<Article> {
        match self {
            Entity::Article(article) => Some(article),
            Entity::Category(_) => None,
        }
    }

    pub fn into_category(self) -> Option<Category> {
        match self {
            Entity::Category(category) => Some(category),
            Entity::Article(_) => None,
        }
    }

    pub fn load_state(&self) -> LoadState {
        match self {
            Entity::Article(article) => article.load_state(),
            Entity::Category(category) => category.load_state(),
        }
    }

    pub fn title(&mut self, store: &dyn GraphStore) -> Result<&str> {
        match self {
            Entity::Article(article) => article.title(store),
            Entity::Category(category) => category.title(store),
        }
    }

    pub fn language(&mut self, store: &dyn GraphStore) -> Result<&str> {
        match self {
            Entity::Article(article) => article.language(store),
            Entity::Category(category) => category.language(store),
        }
    }
}

impl Page for Entity {
    fn id(&self) -> NodeId {
        match self {
            Entity::Article(article) => article.id(),
            Entity::Category(category) => category.id(),
        }
    }

    fn tag(&self) -> TypeTag {
        match self {
            Entity::Article(article) => article.tag(),
            Entity::Category(category) => category.tag(),
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl From<Article> for Entity {
    fn from(article: Article) -> Self {
        Entity::Article(article)
    }
}

impl From<Category> for Entity {
    fn from(category: Category) -> Self {
        Entity::Category(category)
    }
}
