//! Articles: plain, redirect and disambiguation.

use serde::Serialize;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use super::page::{required, Loadable, LoadState, Page, PageAttributes};
use super::{Category, PageSet, TypeTag, Variant};
use crate::error::{ConsistencyViolation, Result, WikiError};
use crate::factory::PageFactory;
use crate::link::{CrossLink, InternalLink};
use crate::store::{
    Direction, GraphStore, LinkFilter, NodeId, PageKind, Property, Row, Traversal, TARGET_COLUMN,
};
use crate::{disambiguation, redirect};

/// Geographic coordinates of an article describing a place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spatial {
    pub globe: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub spatial_type: Option<String>,
}

/// A lazily loaded article.
///
/// Getters take `&mut self` and the store: the first one issues the detail
/// query, later ones read cached values until [`Article::mark_dirty`].
#[derive(Debug, Clone)]
pub struct Article {
    id: NodeId,
    variant: Variant,
    state: LoadState,
    attributes: PageAttributes,
    outdegree: Option<u32>,
    indegree: Option<u32>,
    spatial: Option<Spatial>,
}

impl Article {
    pub(crate) fn new(id: NodeId, variant: Variant) -> Self {
        Self {
            id,
            variant,
            state: LoadState::Unloaded,
            attributes: PageAttributes::default(),
            outdegree: None,
            indegree: None,
            spatial: None,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn is_redirect(&self) -> bool {
        self.variant == Variant::Redirect
    }

    pub fn is_disambiguation(&self) -> bool {
        self.variant == Variant::Disambiguation
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    /// Forget cached attributes; the next getter reloads them.
    pub fn mark_dirty(&mut self) {
        self.state = LoadState::Unloaded;
    }

    /// Attributes as currently held, without loading.
    pub fn attributes(&self) -> &PageAttributes {
        &self.attributes
    }

    /// Load attributes now if they are not loaded yet.
    pub fn load(&mut self, store: &dyn GraphStore) -> Result<()> {
        self.ensure_loaded(store)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    pub fn title(&mut self, store: &dyn GraphStore) -> Result<&str> {
        self.ensure_loaded(store)?;
        required(self.attributes.title.as_deref(), self.id, PageKind::Article, "title")
    }

    pub fn language(&mut self, store: &dyn GraphStore) -> Result<&str> {
        self.ensure_loaded(store)?;
        required(self.attributes.language.as_deref(), self.id, PageKind::Article, "lang")
    }

    /// Identifier assigned by Wikimedia.
    pub fn wiki_id(&mut self, store: &dyn GraphStore) -> Result<&str> {
        self.ensure_loaded(store)?;
        required(self.attributes.wiki_id.as_deref(), self.id, PageKind::Article, "wikiid")
    }

    /// Number of categories containing this article.
    pub fn parents(&mut self, store: &dyn GraphStore) -> Result<u32> {
        self.ensure_loaded(store)?;
        required(self.attributes.parents, self.id, PageKind::Article, "parents")
    }

    pub fn outdegree(&mut self, store: &dyn GraphStore) -> Result<u32> {
        self.ensure_loaded(store)?;
        required(self.outdegree, self.id, PageKind::Article, "outdegree")
    }

    pub fn indegree(&mut self, store: &dyn GraphStore) -> Result<u32> {
        self.ensure_loaded(store)?;
        required(self.indegree, self.id, PageKind::Article, "indegree")
    }

    pub fn spatial(&mut self, store: &dyn GraphStore) -> Result<Option<&Spatial>> {
        self.ensure_loaded(store)?;
        Ok(self.spatial.as_ref())
    }

    /// Whether the article carries coordinates.
    pub fn describes_spatial_entity(&mut self, store: &dyn GraphStore) -> Result<bool> {
        Ok(self.spatial(store)?.is_some())
    }

    // Setters overwrite the cached value and leave the load state alone, so
    // on an unloaded article the next getter replaces them with stored values.

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.attributes.title = Some(title.into());
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.attributes.language = Some(language.into());
    }

    pub fn set_wiki_id(&mut self, wiki_id: impl Into<String>) {
        self.attributes.wiki_id = Some(wiki_id.into());
    }

    pub fn set_parents(&mut self, parents: u32) {
        self.attributes.parents = Some(parents);
    }

    pub fn set_outdegree(&mut self, outdegree: u32) {
        self.outdegree = Some(outdegree);
    }

    pub fn set_indegree(&mut self, indegree: u32) {
        self.indegree = Some(indegree);
    }

    pub fn set_spatial(&mut self, spatial: Option<Spatial>) {
        self.spatial = spatial;
    }

    // =========================================================================
    // Redirects and Disambiguation
    // =========================================================================

    /// Final non-redirect target, `None` on a redirect cycle.
    pub fn redirects_to(&self, store: &dyn GraphStore) -> Result<Option<Article>> {
        if !self.is_redirect() {
            return Err(WikiError::NotARedirect(self.id));
        }
        redirect::resolve_article(store, self.id)
    }

    /// Every non-redirect, non-disambiguation article this page points to.
    pub fn interpretations(&self, store: &dyn GraphStore) -> Result<PageSet<Article>> {
        if !self.is_disambiguation() {
            return Err(WikiError::NotADisambiguation(self.id));
        }
        disambiguation::interpretations(store, self.id)
    }

    // =========================================================================
    // Links
    // =========================================================================

    fn linked(
        &self,
        store: &dyn GraphStore,
        direction: Direction,
        filter: LinkFilter,
    ) -> Result<PageSet<Article>> {
        PageFactory::new(store).articles(self.id, Traversal::Links { direction, filter })
    }

    /// Articles this article links to.
    pub fn links_to(&self, store: &dyn GraphStore) -> Result<PageSet<Article>> {
        self.linked(store, Direction::Outgoing, LinkFilter::Any)
    }

    /// Outgoing links whose first occurrence has rank `<= max_rank`.
    pub fn links_to_rank(&self, store: &dyn GraphStore, max_rank: u32) -> Result<PageSet<Article>> {
        self.linked(store, Direction::Outgoing, LinkFilter::MaxRank(max_rank))
    }

    /// Outgoing links whose first occurrence is within `max_offset` of the text start.
    pub fn links_to_offset(
        &self,
        store: &dyn GraphStore,
        max_offset: u32,
    ) -> Result<PageSet<Article>> {
        self.linked(store, Direction::Outgoing, LinkFilter::MaxOffset(max_offset))
    }

    pub fn links_to_intro(&self, store: &dyn GraphStore) -> Result<PageSet<Article>> {
        self.linked(store, Direction::Outgoing, LinkFilter::Intro)
    }

    pub fn links_to_infobox(&self, store: &dyn GraphStore) -> Result<PageSet<Article>> {
        self.linked(store, Direction::Outgoing, LinkFilter::Infobox)
    }

    /// Articles linking to this article.
    pub fn links_from(&self, store: &dyn GraphStore) -> Result<PageSet<Article>> {
        self.linked(store, Direction::Incoming, LinkFilter::Any)
    }

    pub fn links_from_rank(
        &self,
        store: &dyn GraphStore,
        max_rank: u32,
    ) -> Result<PageSet<Article>> {
        self.linked(store, Direction::Incoming, LinkFilter::MaxRank(max_rank))
    }

    pub fn links_from_offset(
        &self,
        store: &dyn GraphStore,
        max_offset: u32,
    ) -> Result<PageSet<Article>> {
        self.linked(store, Direction::Incoming, LinkFilter::MaxOffset(max_offset))
    }

    pub fn links_from_intro(&self, store: &dyn GraphStore) -> Result<PageSet<Article>> {
        self.linked(store, Direction::Incoming, LinkFilter::Intro)
    }

    pub fn links_from_infobox(&self, store: &dyn GraphStore) -> Result<PageSet<Article>> {
        self.linked(store, Direction::Incoming, LinkFilter::Infobox)
    }

    /// Internal links with their positional metadata.
    ///
    /// The other endpoint is redirect-resolved; links whose endpoint cannot
    /// be resolved are left out. When several edges resolve to the same
    /// article (a direct link and one through a redirect), only the first
    /// edge in store order is kept. This article appears as a clone on its side.
    pub fn internal_links(
        &self,
        store: &dyn GraphStore,
        direction: Direction,
        filter: LinkFilter,
    ) -> Result<Vec<InternalLink>> {
        let factory = PageFactory::new(store);
        let rows = factory.traverse(self.id, Traversal::Links { direction, filter })?;

        let mut links = Vec::with_capacity(rows.len());
        let mut seen = BTreeSet::new();
        for row in &rows {
            let node = row.node(TARGET_COLUMN)?;
            if let Some(other) = factory.settle::<Article>(node)? {
                if !seen.insert(other.id()) {
                    continue;
                }
                let (source, target) = match direction {
                    Direction::Outgoing => (self.clone(), other),
                    Direction::Incoming => (other, self.clone()),
                };
                links.push(InternalLink::from_row(source.into(), target.into(), row)?);
            }
        }
        Ok(links)
    }

    // =========================================================================
    // Categories and Cross-links
    // =========================================================================

    /// Categories containing this article.
    pub fn parent_categories(&self, store: &dyn GraphStore) -> Result<PageSet<Category>> {
        PageFactory::new(store).categories(self.id, Traversal::ParentCategories)
    }

    /// The same subject in other language editions.
    pub fn cross_linked_articles(&self, store: &dyn GraphStore) -> Result<PageSet<Article>> {
        self.cross_linked_articles_in_any(store, &[])
    }

    pub fn cross_linked_articles_in(
        &self,
        store: &dyn GraphStore,
        language: &str,
    ) -> Result<PageSet<Article>> {
        self.cross_linked_articles_in_any(store, &[language])
    }

    /// Cross-linked articles in any of `languages`; an empty slice means any language.
    pub fn cross_linked_articles_in_any(
        &self,
        store: &dyn GraphStore,
        languages: &[&str],
    ) -> Result<PageSet<Article>> {
        PageFactory::new(store).articles(
            self.id,
            Traversal::CrossLinks {
                kind: PageKind::Article,
                languages: languages.iter().map(|l| l.to_string()).collect(),
            },
        )
    }

    /// Cross-links to other language editions, as link values.
    pub fn cross_links(&self, store: &dyn GraphStore) -> Result<Vec<CrossLink>> {
        let targets = self.cross_linked_articles(store)?;
        Ok(targets
            .into_iter()
            .map(|target| CrossLink::new(self.clone().into(), target.into()))
            .collect())
    }
}

impl Page for Article {
    fn id(&self) -> NodeId {
        self.id
    }

    fn tag(&self) -> TypeTag {
        TypeTag::new(PageKind::Article, self.variant)
    }
}

impl Loadable for Article {
    const KIND: PageKind = PageKind::Article;

    fn properties() -> Vec<Property> {
        let mut properties = PageAttributes::PROPERTIES.to_vec();
        properties.extend([
            Property::Outdegree,
            Property::Indegree,
            Property::Globe,
            Property::Latitude,
            Property::Longitude,
            Property::SpatialType,
        ]);
        properties
    }

    fn unloaded(id: NodeId, variant: Variant) -> Self {
        Self::new(id, variant)
    }

    fn load_state(&self) -> LoadState {
        self.state
    }

    fn populate(&mut self, row: &Row) -> Result<()> {
        let attributes = PageAttributes::from_row(row)?;
        let outdegree = row.opt_count(Property::Outdegree.column())?;
        let indegree = row.opt_count(Property::Indegree.column())?;

        let spatial = match row.opt_float(Property::Latitude.column())? {
            Some(latitude) => {
                let longitude = row
                    .opt_float(Property::Longitude.column())?
                    .ok_or(ConsistencyViolation::PartialSpatialGroup { node: self.id })?;
                Some(Spatial {
                    globe: row.opt_text(Property::Globe.column())?.map(str::to_string),
                    latitude,
                    longitude,
                    spatial_type: row
                        .opt_text(Property::SpatialType.column())?
                        .map(str::to_string),
                })
            }
            None => None,
        };

        self.attributes = attributes;
        self.outdegree = outdegree;
        self.indegree = indegree;
        self.spatial = spatial;
        self.state = LoadState::Loaded;
        Ok(())
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
