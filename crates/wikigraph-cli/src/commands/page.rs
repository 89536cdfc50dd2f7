//! Article and category commands - Look up a page and show its attributes

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use wikigraph_config::WikigraphConfig;
use wikigraph_core::{Article, Category, GraphStore, Page, Spatial};

use super::{print_info, print_pages, summarize_articles, summarize_categories, OpenGraph};
use crate::GlobalOptions;

/// Arguments for the article command
#[derive(Args, Debug)]
pub struct ArticleArgs {
    /// Article title
    pub title: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the category command
#[derive(Args, Debug)]
pub struct CategoryArgs {
    /// Category title
    pub title: String,

    /// List member articles
    #[arg(long, conflicts_with_all = ["children", "parents"])]
    pub members: bool,

    /// List child categories
    #[arg(long, conflicts_with = "parents")]
    pub children: bool,

    /// List parent categories
    #[arg(long)]
    pub parents: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Attributes of an article as printed by `article`.
#[derive(Debug, Serialize)]
pub struct ArticleReport {
    pub id: i64,
    pub kind: String,
    pub title: String,
    pub language: String,
    pub wiki_id: String,
    pub parents: u32,
    pub outdegree: u32,
    pub indegree: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spatial: Option<Spatial>,
}

impl ArticleReport {
    fn load(article: &mut Article, store: &dyn GraphStore) -> Result<Self> {
        Ok(Self {
            id: article.id().get(),
            kind: article.tag().to_string(),
            title: article.title(store)?.to_string(),
            language: article.language(store)?.to_string(),
            wiki_id: article.wiki_id(store)?.to_string(),
            parents: article.parents(store)?,
            outdegree: article.outdegree(store)?,
            indegree: article.indegree(store)?,
            spatial: article.spatial(store)?.cloned(),
        })
    }
}

/// Attributes of a category as printed by `category`.
#[derive(Debug, Serialize)]
pub struct CategoryReport {
    pub id: i64,
    pub kind: String,
    pub title: String,
    pub language: String,
    pub wiki_id: String,
    pub parents: u32,
    pub children: u32,
    pub size: u32,
}

impl CategoryReport {
    fn load(category: &mut Category, store: &dyn GraphStore) -> Result<Self> {
        Ok(Self {
            id: category.id().get(),
            kind: category.tag().to_string(),
            title: category.title(store)?.to_string(),
            language: category.language(store)?.to_string(),
            wiki_id: category.wiki_id(store)?.to_string(),
            parents: category.parents(store)?,
            children: category.children(store)?,
            size: category.size(store)?,
        })
    }
}

/// Execute the article command
pub fn execute_article(
    args: ArticleArgs,
    global: &GlobalOptions,
    config: &WikigraphConfig,
) -> Result<()> {
    let graph = OpenGraph::open(global, config)?;
    let mut article = graph.article(&args.title)?;
    let report = ArticleReport::load(&mut article, graph.store())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} (#{})", report.title, report.id);
    println!("  kind:      {}", report.kind);
    println!("  language:  {}", report.language);
    println!("  wiki id:   {}", report.wiki_id);
    println!("  parents:   {}", report.parents);
    println!("  outdegree: {}", report.outdegree);
    println!("  indegree:  {}", report.indegree);
    if let Some(ref spatial) = report.spatial {
        println!(
            "  location:  {}, {} ({})",
            spatial.latitude,
            spatial.longitude,
            spatial.globe.as_deref().unwrap_or("earth")
        );
    }

    if article.is_redirect() {
        print_info("Use `wikigraph redirect` to resolve this page", global.quiet);
    } else if article.is_disambiguation() {
        print_info(
            "Use `wikigraph interpretations` to expand this page",
            global.quiet,
        );
    }

    Ok(())
}

/// Execute the category command
pub fn execute_category(
    args: CategoryArgs,
    global: &GlobalOptions,
    config: &WikigraphConfig,
) -> Result<()> {
    let graph = OpenGraph::open(global, config)?;
    let store = graph.store();
    let mut category = graph.category(&args.title)?;

    if args.members {
        let members = summarize_articles(category.member_articles(store)?, store)?;
        return print_pages(&members, args.json, global.quiet);
    }
    if args.children {
        let children = summarize_categories(category.children_categories(store)?, store)?;
        return print_pages(&children, args.json, global.quiet);
    }
    if args.parents {
        let parents = summarize_categories(category.parent_categories(store)?, store)?;
        return print_pages(&parents, args.json, global.quiet);
    }

    let report = CategoryReport::load(&mut category, store)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} (#{})", report.title, report.id);
    println!("  kind:      {}", report.kind);
    println!("  language:  {}", report.language);
    println!("  wiki id:   {}", report.wiki_id);
    println!("  parents:   {}", report.parents);
    println!("  children:  {}", report.children);
    println!("  size:      {}", report.size);

    Ok(())
}
