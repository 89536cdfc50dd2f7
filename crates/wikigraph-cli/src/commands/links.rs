//! Traversal commands - Links, parent categories and cross-language links

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use wikigraph_config::WikigraphConfig;
use wikigraph_core::{Article, Direction, GraphStore, InternalLink, LinkFilter, Page, PageSet};

use super::{print_info, print_pages, summarize_articles, summarize_categories, OpenGraph};
use crate::GlobalOptions;

/// Arguments for the links command
#[derive(Args, Debug)]
pub struct LinksArgs {
    /// Article title
    pub title: String,

    /// Follow links pointing at the article instead of away from it
    #[arg(long)]
    pub incoming: bool,

    /// Keep links whose first occurrence ranks at most N
    #[arg(long, value_name = "N", conflicts_with_all = ["max_offset", "intro", "infobox"])]
    pub max_rank: Option<u32>,

    /// Keep links whose first occurrence starts at most N characters in
    #[arg(long, value_name = "N", conflicts_with_all = ["intro", "infobox"])]
    pub max_offset: Option<u32>,

    /// Keep links first occurring in the introduction
    #[arg(long, conflicts_with = "infobox")]
    pub intro: bool,

    /// Keep links first occurring in the infobox
    #[arg(long)]
    pub infobox: bool,

    /// Show link metadata (rank, occurrences, position)
    #[arg(long)]
    pub details: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl LinksArgs {
    fn direction(&self) -> Direction {
        if self.incoming {
            Direction::Incoming
        } else {
            Direction::Outgoing
        }
    }

    fn filter(&self) -> LinkFilter {
        if let Some(max) = self.max_rank {
            LinkFilter::MaxRank(max)
        } else if let Some(max) = self.max_offset {
            LinkFilter::MaxOffset(max)
        } else if self.intro {
            LinkFilter::Intro
        } else if self.infobox {
            LinkFilter::Infobox
        } else {
            LinkFilter::Any
        }
    }
}

/// Arguments for the categories command
#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Article title
    pub title: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the crosslinks command
#[derive(Args, Debug)]
pub struct CrosslinksArgs {
    /// Page title
    pub title: String,

    /// Restrict to these language editions (defaults to lookup.crosslink_languages)
    #[arg(long = "to", value_name = "LANG")]
    pub languages: Vec<String>,

    /// Look up a category instead of an article
    #[arg(long)]
    pub category: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// One internal link as printed by `links --details`.
#[derive(Debug, Serialize)]
pub struct LinkReport {
    pub id: i64,
    pub title: String,
    pub rank: u32,
    pub occurrences: u32,
    pub intro: bool,
    pub infobox: bool,
}

impl LinkReport {
    fn from_link(link: &InternalLink, direction: Direction, store: &dyn GraphStore) -> Result<Self> {
        let mut other = match direction {
            Direction::Outgoing => link.target().clone(),
            Direction::Incoming => link.source().clone(),
        };
        Ok(Self {
            id: other.id().get(),
            title: other.title(store)?.to_string(),
            rank: link.rank(),
            occurrences: link.occurrences(),
            intro: link.intro(),
            infobox: link.infobox(),
        })
    }

    fn position(&self) -> &'static str {
        match (self.intro, self.infobox) {
            (true, true) => "intro, infobox",
            (true, false) => "intro",
            (false, true) => "infobox",
            (false, false) => "body",
        }
    }
}

fn linked_articles(
    article: &Article,
    store: &dyn GraphStore,
    direction: Direction,
    filter: LinkFilter,
) -> Result<PageSet<Article>> {
    let set = match (direction, filter) {
        (Direction::Outgoing, LinkFilter::Any) => article.links_to(store)?,
        (Direction::Outgoing, LinkFilter::MaxRank(max)) => article.links_to_rank(store, max)?,
        (Direction::Outgoing, LinkFilter::MaxOffset(max)) => article.links_to_offset(store, max)?,
        (Direction::Outgoing, LinkFilter::Intro) => article.links_to_intro(store)?,
        (Direction::Outgoing, LinkFilter::Infobox) => article.links_to_infobox(store)?,
        (Direction::Incoming, LinkFilter::Any) => article.links_from(store)?,
        (Direction::Incoming, LinkFilter::MaxRank(max)) => article.links_from_rank(store, max)?,
        (Direction::Incoming, LinkFilter::MaxOffset(max)) => {
            article.links_from_offset(store, max)?
        }
        (Direction::Incoming, LinkFilter::Intro) => article.links_from_intro(store)?,
        (Direction::Incoming, LinkFilter::Infobox) => article.links_from_infobox(store)?,
    };
    Ok(set)
}

/// Execute the links command
pub fn execute_links(
    args: LinksArgs,
    global: &GlobalOptions,
    config: &WikigraphConfig,
) -> Result<()> {
    let graph = OpenGraph::open(global, config)?;
    let store = graph.store();
    let article = graph.article(&args.title)?;
    let direction = args.direction();
    let filter = args.filter();

    if !args.details {
        let linked = linked_articles(&article, store, direction, filter)?;
        let summaries = summarize_articles(linked, store)?;
        return print_pages(&summaries, args.json, global.quiet);
    }

    let reports = article
        .internal_links(store, direction, filter)?
        .iter()
        .map(|link| LinkReport::from_link(link, direction, store))
        .collect::<Result<Vec<_>>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!(
            "{:>8}  {}  rank {}, {} occurrence(s), {}",
            format!("#{}", report.id),
            report.title,
            report.rank,
            report.occurrences,
            report.position()
        );
    }
    print_info(&format!("{} link(s)", reports.len()), global.quiet);

    Ok(())
}

/// Execute the categories command
pub fn execute_categories(
    args: CategoriesArgs,
    global: &GlobalOptions,
    config: &WikigraphConfig,
) -> Result<()> {
    let graph = OpenGraph::open(global, config)?;
    let store = graph.store();
    let article = graph.article(&args.title)?;

    let categories = summarize_categories(article.parent_categories(store)?, store)?;
    print_pages(&categories, args.json, global.quiet)
}

/// Execute the crosslinks command
pub fn execute_crosslinks(
    args: CrosslinksArgs,
    global: &GlobalOptions,
    config: &WikigraphConfig,
) -> Result<()> {
    let graph = OpenGraph::open(global, config)?;
    let store = graph.store();

    let languages = if args.languages.is_empty() {
        config.lookup.crosslink_languages.clone()
    } else {
        args.languages
    };
    let languages: Vec<&str> = languages.iter().map(String::as_str).collect();

    let summaries = if args.category {
        let category = graph.category(&args.title)?;
        summarize_categories(
            category.cross_linked_categories_in_any(store, &languages)?,
            store,
        )?
    } else {
        let article = graph.article(&args.title)?;
        summarize_articles(article.cross_linked_articles_in_any(store, &languages)?, store)?
    };

    print_pages(&summaries, args.json, global.quiet)
}
