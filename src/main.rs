//! # Complaint Resolver CLI (`resolve`)
//!
//! ## Usage
//!
//! ```bash
//! resolve --config ./config/resolver.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `resolve plan "<complaint>" --category LABEL_7` | Generate a resolution plan |
//! | `resolve search "<query>"` | Show the precedents a query retrieves |
//! | `resolve index` | Persist the seed corpus as the on-disk index |
//! | `resolve reset` | Delete the on-disk index |
//! | `resolve categories` | List classifier labels and category names |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `info`).

use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use complaint_resolver::categories::{self, resolve_category_arg, Category};
use complaint_resolver::config;
use complaint_resolver::knowledge::ResetOutcome;
use complaint_resolver::pipeline::ResolutionPipeline;

/// Complaint Resolver: retrieval-augmented resolution plans for
/// classified banking complaints.
#[derive(Parser)]
#[command(name = "resolve", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "./config/resolver.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a resolution plan for a complaint.
    Plan {
        /// Complaint text.
        complaint: String,

        /// Classifier label (`LABEL_0`..`LABEL_10`) or a category name.
        #[arg(long)]
        category: String,
    },

    /// Show the precedent documents retrieved for a query.
    Search {
        query: String,
    },

    /// Embed the seed corpus and write it to the persistent index location.
    Index,

    /// Delete the persistent index. The next run rebuilds from the seed corpus.
    Reset,

    /// List classifier labels and their category names.
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    categories::validate_mapping()?;

    let cli = Cli::parse();

    if let Commands::Categories = cli.command {
        for (code, cat) in Category::all() {
            println!("{:<9} {}", code, cat.name());
        }
        return Ok(());
    }

    let cfg = config::load_or_default(&cli.config)?;
    let pipeline = ResolutionPipeline::from_config(&cfg);

    match cli.command {
        Commands::Plan {
            complaint,
            category,
        } => {
            if complaint.trim().is_empty() {
                bail!("Please enter a complaint.");
            }
            let category = resolve_category_arg(&category);
            println!("Category: {}\n", category);
            println!(
                "{}",
                pipeline.generate_resolution(&complaint, &category).await
            );
        }
        Commands::Search { query } => {
            if query.trim().is_empty() {
                println!("No results.");
                return Ok(());
            }
            let hits = pipeline.search(&query).await?;
            for hit in hits {
                println!(
                    "{}. [{:.3}] {}",
                    hit.rank + 1,
                    hit.score,
                    hit.document.metadata.issue
                );
                println!("   {}\n", hit.document.content.replace('\n', "\n   "));
            }
        }
        Commands::Index => {
            let count = pipeline.knowledge().persist_seed().await?;
            println!(
                "Indexed {} documents into {}",
                count,
                pipeline.knowledge().persist_dir().display()
            );
        }
        Commands::Reset => match pipeline.reset_knowledge().await {
            Ok(ResetOutcome::Cleared) => {
                println!("Persistent index deleted. Reverting to sample data.")
            }
            Ok(ResetOutcome::CacheOnly) | Ok(ResetOutcome::NothingToClear) => {
                println!("No persistent index found. Cache cleared.")
            }
            Err(e) => eprintln!("{:#}", e),
        },
        Commands::Categories => {}
    }

    Ok(())
}
