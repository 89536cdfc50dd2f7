//! Common test utilities for integration tests.
//!
//! Builds a small in-memory dataset shared by the integration test files.

#![allow(dead_code)]

use std::sync::Arc;

use wikigraph_core::{
    InstrumentedStore, LinkRecord, NodeId, PageRecord, SqliteGraphStore, Wikipedia,
};

/// Node ids of the sample dataset.
#[derive(Debug, Clone, Copy)]
pub struct SampleIds {
    pub obama: NodeId,
    pub obama_fr: NodeId,
    pub obama_de: NodeId,
    pub hawaii: NodeId,
    pub honolulu: NodeId,
    pub senate: NodeId,
    pub president: NodeId,
    /// Redirect "Obama" → Barack Obama
    pub obama_redirect: NodeId,
    /// Redirects "Loop A" ↔ "Loop B"
    pub loop_a: NodeId,
    pub loop_b: NodeId,
    /// Disambiguation page "Washington"
    pub washington: NodeId,
    pub washington_state: NodeId,
    pub washington_dc: NodeId,
    /// Redirect "George Washington (president)" → George Washington
    pub gw_redirect: NodeId,
    pub george_washington: NodeId,
    pub presidents_category: NodeId,
    pub people_category: NodeId,
    pub presidents_category_fr: NodeId,
}

/// Populate `store` with the sample dataset.
///
/// Barack Obama links to Hawaii (rank 2, intro), United States Senate
/// (rank 3, infobox), Honolulu (rank 5) and Loop A (rank 6, a redirect
/// caught in a cycle).
pub fn populate(store: &SqliteGraphStore) -> SampleIds {
    let page = |record: PageRecord| store.insert_page(&record).unwrap();

    let obama = page(
        PageRecord::article("Barack Obama", "en")
            .with_wiki_id("534366")
            .with_parents(2)
            .with_degrees(4, 3),
    );
    let obama_fr = page(PageRecord::article("Barack Obama", "fr").with_wiki_id("534366"));
    let obama_de = page(PageRecord::article("Barack Obama", "de").with_wiki_id("534366"));
    let hawaii = page(
        PageRecord::article("Hawaii", "en")
            .with_coordinates(21.3, -157.8)
            .with_globe("earth")
            .with_spatial_type("adm1st"),
    );
    let honolulu = page(PageRecord::article("Honolulu", "en"));
    let senate = page(PageRecord::article("United States Senate", "en"));
    let president = page(PageRecord::article("President of the United States", "en"));
    let obama_redirect = page(PageRecord::article("Obama", "en").redirect());
    let loop_a = page(PageRecord::article("Loop A", "en").redirect());
    let loop_b = page(PageRecord::article("Loop B", "en").redirect());
    let washington = page(PageRecord::article("Washington", "en").disambiguation());
    let washington_state = page(PageRecord::article("Washington (state)", "en"));
    let washington_dc = page(PageRecord::article("Washington, D.C.", "en"));
    let gw_redirect = page(PageRecord::article("George Washington (president)", "en").redirect());
    let george_washington = page(PageRecord::article("George Washington", "en"));
    let presidents_category = page(
        PageRecord::category("Presidents of the United States", "en").with_category_counts(0, 2),
    );
    let people_category =
        page(PageRecord::category("People", "en").with_category_counts(1, 0));
    let presidents_category_fr =
        page(PageRecord::category("Président des États-Unis", "fr"));

    // Internal links
    store
        .insert_link(obama, hawaii, LinkRecord::at(2, 120).in_intro().with_occurrences(4))
        .unwrap();
    store.insert_link(obama, honolulu, LinkRecord::at(5, 900)).unwrap();
    store
        .insert_link(obama, senate, LinkRecord::at(3, 40).in_infobox())
        .unwrap();
    store.insert_link(obama, loop_a, LinkRecord::at(6, 1500)).unwrap();
    store.insert_link(hawaii, obama_redirect, LinkRecord::at(1, 10)).unwrap();
    store.insert_link(president, obama, LinkRecord::at(4, 300)).unwrap();
    store.insert_link(george_washington, president, LinkRecord::at(1, 5)).unwrap();

    // Redirects
    store.insert_redirect(obama_redirect, obama).unwrap();
    store.insert_redirect(loop_a, loop_b).unwrap();
    store.insert_redirect(loop_b, loop_a).unwrap();
    store.insert_redirect(gw_redirect, george_washington).unwrap();

    // Disambiguation
    for target in [washington_state, washington_dc, gw_redirect] {
        store
            .insert_link(washington, target, LinkRecord::default().disambiguation())
            .unwrap();
    }

    // Categories
    store.insert_membership(obama, presidents_category).unwrap();
    store.insert_membership(george_washington, presidents_category).unwrap();
    store.insert_membership(obama, people_category).unwrap();
    store.insert_membership(presidents_category, people_category).unwrap();

    // Cross-language links
    store.insert_crosslink(obama, obama_fr).unwrap();
    store.insert_crosslink(obama, obama_de).unwrap();
    store
        .insert_crosslink(presidents_category, presidents_category_fr)
        .unwrap();

    SampleIds {
        obama,
        obama_fr,
        obama_de,
        hawaii,
        honolulu,
        senate,
        president,
        obama_redirect,
        loop_a,
        loop_b,
        washington,
        washington_state,
        washington_dc,
        gw_redirect,
        george_washington,
        presidents_category,
        people_category,
        presidents_category_fr,
    }
}

/// An instrumented in-memory store holding the sample dataset.
pub fn create_test_store() -> (Arc<InstrumentedStore<SqliteGraphStore>>, SampleIds) {
    let store = SqliteGraphStore::in_memory().unwrap();
    let ids = populate(&store);
    (Arc::new(InstrumentedStore::new(store)), ids)
}

/// A façade over the sample dataset, plus the instrumented store behind it.
pub fn create_test_wiki() -> (
    Wikipedia,
    Arc<InstrumentedStore<SqliteGraphStore>>,
    SampleIds,
) {
    let (store, ids) = create_test_store();
    let wiki = Wikipedia::with_store(store.clone());
    (wiki, store, ids)
}
