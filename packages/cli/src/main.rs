#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the insolation acquisition pipeline.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use sun_map_pipeline::FetchExtractAnalyzer;
use sun_map_storage::MemoryStore;

#[derive(Parser)]
#[command(name = "sun_map", about = "Insolation forecast acquisition tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one full pipeline run
    Run {
        /// Run through reconciliation but skip the storage upsert
        #[arg(long)]
        dry_run: bool,
        /// Maximum number of images to process (for testing)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the forecast-map images the pipeline would fetch
    Sources,
    /// Start the HTTP trigger API server
    Serve,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { dry_run, limit } => {
            let provider = sun_map_ai::providers::create_provider_from_env()
                .expect("Failed to configure vision provider");
            let analyzer = FetchExtractAnalyzer::new(provider);
            let store = MemoryStore::new();

            let mut sources = sun_map_source::registry::list_sources();
            if let Some(limit) = limit {
                sources.truncate(limit);
            }

            match sun_map_pipeline::run_with_sources(&analyzer, &store, &sources, dry_run).await {
                Ok(summary) => {
                    println!(
                        "Run complete: {} processed, {} failed, {} writes{}",
                        summary.processed_images,
                        summary.failed_images,
                        summary.database_writes,
                        if summary.dry_run { " (dry run)" } else { "" },
                    );
                    for error in &summary.errors {
                        println!("  error: {error}");
                    }
                }
                Err(e) => {
                    log::error!("Pipeline run failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Sources => {
            for source in sun_map_source::registry::list_sources() {
                println!("{:>3}%  {}", source.percentage_tag, source.url);
            }
        }
        Commands::Serve => {
            let provider = sun_map_ai::providers::create_provider_from_env()
                .expect("Failed to configure vision provider");

            sun_map_server::run_server(
                Arc::new(MemoryStore::new()),
                Arc::new(FetchExtractAnalyzer::new(provider)),
            )
            .await?;
        }
    }

    Ok(())
}
