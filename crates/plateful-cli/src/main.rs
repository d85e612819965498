mod seed;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "plateful-cli")]
#[command(about = "Plateful data maintenance CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Bulk-load a scraped restaurant dump into the store.
    Seed {
        /// Path to the dump JSON file.
        #[arg(long)]
        file: PathBuf,
        /// Records per insert transaction.
        #[arg(long, default_value_t = 100)]
        batch_size: usize,
    },
    /// Remove duplicate restaurants, grouped by name, keeping the
    /// first-encountered record of each group.
    Dedupe {
        /// Report how many records would be removed without removing them.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let pool = plateful_db::connect_pool_from_env().await?;
    plateful_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Seed { file, batch_size } => {
            let summary = seed::run_seed(&pool, &file, batch_size).await?;
            println!(
                "inserted {} restaurants ({} batches failed, {} dump entries skipped)",
                summary.inserted, summary.failed_batches, summary.skipped_entries
            );
        }
        Commands::Dedupe { dry_run } => {
            if dry_run {
                let count = plateful_db::count_duplicates_by_name(&pool).await?;
                println!("{count} duplicate restaurants would be removed");
            } else {
                let deleted = plateful_db::delete_duplicates_by_name(&pool).await?;
                println!("removed {deleted} duplicate restaurants");
            }
        }
    }

    Ok(())
}
