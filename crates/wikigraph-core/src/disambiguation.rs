//! Disambiguation Expansion
//!
//! A disambiguation article lists the articles a title may refer to through
//! links flagged as disambiguation links. Expansion collects the final
//! readings:
//! - plain article → included
//! - redirect → resolved target included (expanded again if the target is
//!   itself a disambiguation page), dropped if it does not resolve
//! - disambiguation article → its own interpretations are merged in
//!
//! Every disambiguation page is expanded at most once, so pages listing
//! each other terminate.

use std::collections::BTreeSet;
use tracing::debug;

use crate::entity::{Article, Page, PageSet, Variant};
use crate::error::Result;
use crate::factory::PageFactory;
use crate::store::{GraphStore, NodeId, Traversal, TARGET_COLUMN};

/// Interpretations of the disambiguation article `origin`.
pub fn interpretations(store: &dyn GraphStore, origin: NodeId) -> Result<PageSet<Article>> {
    let factory = PageFactory::new(store);
    let mut found = PageSet::new();
    let mut expanded = BTreeSet::new();
    let mut pending = vec![origin];

    while let Some(page) = pending.pop() {
        if !expanded.insert(page) {
            continue;
        }

        let rows = factory.traverse(page, Traversal::DisambiguationLinks)?;
        for row in &rows {
            // settle() follows redirects and drops unresolvable ones
            let Some(article) = factory.settle::<Article>(row.node(TARGET_COLUMN)?)? else {
                continue;
            };

            match article.variant() {
                Variant::Disambiguation => pending.push(article.id()),
                _ => {
                    found.insert(article);
                }
            }
        }
    }

    debug!(%origin, pages = expanded.len(), interpretations = found.len(), "Expanded disambiguation");
    Ok(found)
}
