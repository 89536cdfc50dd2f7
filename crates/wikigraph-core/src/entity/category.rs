//! Categories: plain and redirect.

use std::hash::{Hash, Hasher};

use super::page::{required, Loadable, LoadState, Page, PageAttributes};
use super::{Article, PageSet, TypeTag, Variant};
use crate::error::{Result, WikiError};
use crate::factory::PageFactory;
use crate::link::CrossLink;
use crate::redirect;
use crate::store::{GraphStore, NodeId, PageKind, Property, Row, Traversal};

/// A lazily loaded category.
#[derive(Debug, Clone)]
pub struct Category {
    id: NodeId,
    variant: Variant,
    state: LoadState,
    attributes: PageAttributes,
    children: Option<u32>,
    size: Option<u32>,
}

impl Category {
    pub(crate) fn new(id: NodeId, variant: Variant) -> Self {
        Self {
            id,
            variant,
            state: LoadState::Unloaded,
            attributes: PageAttributes::default(),
            children: None,
            size: None,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn is_redirect(&self) -> bool {
        self.variant == Variant::Redirect
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn mark_dirty(&mut self) {
        self.state = LoadState::Unloaded;
    }

    pub fn attributes(&self) -> &PageAttributes {
        &self.attributes
    }

    pub fn load(&mut self, store: &dyn GraphStore) -> Result<()> {
        self.ensure_loaded(store)
    }

    pub fn title(&mut self, store: &dyn GraphStore) -> Result<&str> {
        self.ensure_loaded(store)?;
        required(self.attributes.title.as_deref(), self.id, PageKind::Category, "title")
    }

    pub fn language(&mut self, store: &dyn GraphStore) -> Result<&str> {
        self.ensure_loaded(store)?;
        required(self.attributes.language.as_deref(), self.id, PageKind::Category, "lang")
    }

    pub fn wiki_id(&mut self, store: &dyn GraphStore) -> Result<&str> {
        self.ensure_loaded(store)?;
        required(self.attributes.wiki_id.as_deref(), self.id, PageKind::Category, "wikiid")
    }

    /// Number of categories containing this category.
    pub fn parents(&mut self, store: &dyn GraphStore) -> Result<u32> {
        self.ensure_loaded(store)?;
        required(self.attributes.parents, self.id, PageKind::Category, "parents")
    }

    /// Number of child categories.
    pub fn children(&mut self, store: &dyn GraphStore) -> Result<u32> {
        self.ensure_loaded(store)?;
        required(self.children, self.id, PageKind::Category, "children")
    }

    /// Number of member articles.
    pub fn size(&mut self, store: &dyn GraphStore) -> Result<u32> {
        self.ensure_loaded(store)?;
        required(self.size, self.id, PageKind::Category, "size")
    }

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

    pub fn set_children(&mut self, children: u32) {
        self.children = Some(children);
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = Some(size);
    }

    /// Final non-redirect target, `None` on a redirect cycle.
    pub fn redirects_to(&self, store: &dyn GraphStore) -> Result<Option<Category>> {
        if !self.is_redirect() {
            return Err(WikiError::NotARedirect(self.id));
        }
        redirect::resolve_category(store, self.id)
    }

    // =========================================================================
    // Traversals
    // =========================================================================

    /// Categories containing this category.
    pub fn parent_categories(&self, store: &dyn GraphStore) -> Result<PageSet<Category>> {
        PageFactory::new(store).categories(self.id, Traversal::ParentCategories)
    }

    /// Categories contained in this category.
    pub fn children_categories(&self, store: &dyn GraphStore) -> Result<PageSet<Category>> {
        PageFactory::new(store).categories(
            self.id,
            Traversal::Members {
                kind: PageKind::Category,
            },
        )
    }

    /// Articles contained in this category.
    pub fn member_articles(&self, store: &dyn GraphStore) -> Result<PageSet<Article>> {
        PageFactory::new(store).articles(
            self.id,
            Traversal::Members {
                kind: PageKind::Article,
            },
        )
    }

    pub fn cross_linked_categories(&self, store: &dyn GraphStore) -> Result<PageSet<Category>> {
        self.cross_linked_categories_in_any(store, &[])
    }

    pub fn cross_linked_categories_in(
        &self,
        store: &dyn GraphStore,
        language: &str,
    ) -> Result<PageSet<Category>> {
        self.cross_linked_categories_in_any(store, &[language])
    }

    /// Cross-linked categories in any of `languages`; an empty slice means any language.
    pub fn cross_linked_categories_in_any(
        &self,
        store: &dyn GraphStore,
        languages: &[&str],
    ) -> Result<PageSet<Category>> {
        PageFactory::new(store).categories(
            self.id,
            Traversal::CrossLinks {
                kind: PageKind::Category,
                languages: languages.iter().map(|l| l.to_string()).collect(),
            },
        )
    }

    pub fn cross_links(&self, store: &dyn GraphStore) -> Result<Vec<CrossLink>> {
        let targets = self.cross_linked_categories(store)?;
        Ok(targets
            .into_iter()
            .map(|target| CrossLink::new(self.clone().into(), target.into()))
            .collect())
    }
}

impl Page for Category {
    fn id(&self) -> NodeId {
        self.id
    }

    fn tag(&self) -> TypeTag {
        TypeTag::new(PageKind::Category, self.variant)
    }
}

impl Loadable for Category {
    const KIND: PageKind = PageKind::Category;

    fn properties() -> Vec<Property> {
        let mut properties = PageAttributes::PROPERTIES.to_vec();
        properties.extend([Property::Children, Property::Size]);
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
        let children = row.opt_count(Property::Children.column())?;
        let size = row.opt_count(Property::Size.column())?;

        self.attributes = attributes;
        self.children = children;
        self.size = size;
        self.state = LoadState::Loaded;
        Ok(())
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
