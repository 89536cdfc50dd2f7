//! Identity-keyed sets of entities.

use std::collections::btree_map::{self, BTreeMap};

use super::Page;
use crate::store::NodeId;

/// A set of pages deduplicated by [`NodeId`], iterated in identity order.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSet<T> {
    pages: BTreeMap<NodeId, T>,
}

impl<T> Default for PageSet<T> {
    fn default() -> Self {
        Self {
            pages: BTreeMap::new(),
        }
    }
}

impl<T: Page> PageSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a page. Returns `false` (and keeps the existing entry) when a
    /// page with the same identity is already present.
    pub fn insert(&mut self, page: T) -> bool {
        match self.pages.entry(page.id()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                slot.insert(page);
                true
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.pages.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.pages.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.pages.get_mut(&id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.pages.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.pages.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pages.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.pages.values_mut()
    }
}

impl<T: Page> FromIterator<T> for PageSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T: Page> Extend<T> for PageSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for page in iter {
            self.insert(page);
        }
    }
}

impl<T> IntoIterator for PageSet<T> {
    type Item = T;
    type IntoIter = btree_map::IntoValues<NodeId, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_values()
    }
}

impl<'a, T> IntoIterator for &'a PageSet<T> {
    type Item = &'a T;
    type IntoIter = btree_map::Values<'a, NodeId, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.values()
    }
}
