//! Redirect and disambiguation commands

use anyhow::{bail, Result};
use clap::Args;
use wikigraph_config::WikigraphConfig;

use super::{print_info, print_pages, summarize_articles, PageSummary, OpenGraph};
use crate::GlobalOptions;

/// Arguments for the redirect command
#[derive(Args, Debug)]
pub struct RedirectArgs {
    /// Title of the redirect page
    pub title: String,

    /// Resolve a category redirect instead of an article redirect
    #[arg(long)]
    pub category: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the interpretations command
#[derive(Args, Debug)]
pub struct InterpretationsArgs {
    /// Title of the disambiguation page
    pub title: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the redirect command
pub fn execute_redirect(
    args: RedirectArgs,
    global: &GlobalOptions,
    config: &WikigraphConfig,
) -> Result<()> {
    let graph = OpenGraph::open(global, config)?;
    let store = graph.store();

    let target = if args.category {
        let category = graph.category(&args.title)?;
        if !category.is_redirect() {
            bail!("'{}' is not a redirect", args.title);
        }
        match category.redirects_to(store)? {
            Some(mut target) => Some(PageSummary::of_category(&mut target, store)?),
            None => None,
        }
    } else {
        let article = graph.article(&args.title)?;
        if !article.is_redirect() {
            bail!("'{}' is not a redirect", args.title);
        }
        match article.redirects_to(store)? {
            Some(mut target) => Some(PageSummary::of_article(&mut target, store)?),
            None => None,
        }
    };

    match target {
        Some(target) => print_pages(&[target], args.json, global.quiet),
        None if args.json => {
            println!("null");
            Ok(())
        }
        None => {
            print_info(
                &format!("'{}' has no target (redirect cycle)", args.title),
                global.quiet,
            );
            Ok(())
        }
    }
}

/// Execute the interpretations command
pub fn execute_interpretations(
    args: InterpretationsArgs,
    global: &GlobalOptions,
    config: &WikigraphConfig,
) -> Result<()> {
    let graph = OpenGraph::open(global, config)?;
    let store = graph.store();
    let article = graph.article(&args.title)?;

    if !article.is_disambiguation() {
        bail!("'{}' is not a disambiguation page", args.title);
    }

    let readings = summarize_articles(article.interpretations(store)?, store)?;
    print_pages(&readings, args.json, global.quiet)
}
