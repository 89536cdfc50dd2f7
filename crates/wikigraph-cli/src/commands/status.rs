//! Status command - Show store statistics and configuration

use anyhow::Result;
use clap::Args;
use wikigraph_config::WikigraphConfig;

use super::{working_dir, OpenGraph};
use crate::GlobalOptions;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show configuration details
    #[arg(long = "show-config")]
    show_config: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the status command
pub fn execute(args: StatusArgs, global: &GlobalOptions, config: &WikigraphConfig) -> Result<()> {
    let database = config.database_path(&working_dir()?);
    let exists = database.exists();

    let stats = if exists {
        let graph = OpenGraph::open(global, config)?;
        Some(graph.sqlite().stats()?)
    } else {
        None
    };

    if args.json {
        let mut status = serde_json::json!({
            "database": database,
            "exists": exists,
            "read_only": config.store.read_only,
            "language": config.lookup.default_language,
        });

        if let Some(ref stats) = stats {
            status["graph"] = serde_json::to_value(stats)?;
        }

        if args.show_config {
            status["config"] = serde_json::to_value(config)?;
        }

        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    // Human-readable output
    println!("WikiGraph Status");
    println!("================\n");

    println!("Database:  {}", database.display());
    println!("Status:    {}", if exists { "Found" } else { "Missing" });
    println!("Language:  {}", config.lookup.default_language);

    let Some(stats) = stats else {
        println!("\nNo graph database found. Pass --database or set store.database.");
        return Ok(());
    };

    println!("\nGraph:");
    println!(
        "  Schema:         v{}",
        stats.schema_version.as_deref().unwrap_or("unknown")
    );
    println!("  Nodes:          {}", stats.node_count);
    println!("  Edges:          {}", stats.edge_count);
    println!("  Articles:       {}", stats.article_count);
    println!("  Categories:     {}", stats.category_count);
    if global.verbose {
        println!("  Redirects:      {}", stats.redirect_count);
        println!("  Disambiguation: {}", stats.disambiguation_count);
    }

    if args.show_config {
        println!("\nConfiguration:");
        println!("  Idle sessions: {}", config.store.max_idle_sessions);
        println!("  Read-only:     {}", config.store.read_only);
        println!("  Log level:     {}", config.logging.level);
        println!("  Log format:    {}", config.logging.format);
        if !config.lookup.crosslink_languages.is_empty() {
            println!("  Cross-link languages:");
            for language in &config.lookup.crosslink_languages {
                println!("    - {}", language);
            }
        }
    }

    Ok(())
}
