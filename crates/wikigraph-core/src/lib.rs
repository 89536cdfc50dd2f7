//! WikiGraph Core - Typed access to a graph-structured Wikipedia dataset
//!
//! This crate provides the entity layer over a graph store:
//! - Articles and categories with plain, redirect and disambiguation variants
//! - Lazy attribute loading through a single detail query per entity
//! - Redirect resolution with cycle detection
//! - Disambiguation expansion
//! - Link, category and cross-language traversals returning redirect-free sets
//! - A pooled SQLite reference store

pub mod disambiguation;
pub mod entity;
pub mod error;
pub mod factory;
pub mod link;
pub mod redirect;
pub mod store;
pub mod wikipedia;

// Entity re-exports
pub use entity::{
    Article, Category, Entity, LoadState, Page, PageAttributes, PageSet, Spatial, TypeTag,
    Variant,
};

// Error re-exports
pub use error::{ConsistencyViolation, WikiError};

// Factory and traversal re-exports
pub use factory::PageFactory;
pub use link::{CrossLink, InternalLink, Link};
pub use redirect::{resolve_article, resolve_category};

// Store re-exports
pub use store::{
    Direction, GraphStore, InstrumentedStore, LinkFilter, LinkRecord, NodeId, NodeRef, PageKind,
    PageRecord, QueryStats, SqliteGraphStore, StoreError, StoreOptions, StoreStats,
};

// Façade re-exports
pub use wikipedia::{Wikipedia, DEFAULT_DATABASE};
