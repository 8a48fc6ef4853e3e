//! `DevPooja` CLI - catalog loading and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Load the catalog through the cache/Sheets/fallback chain
//! devpooja load
//!
//! # Show one product with its related items
//! devpooja show 5
//!
//! # List categories, or the products in one
//! devpooja category
//! devpooja category diyas
//!
//! # Drop the cached snapshot
//! devpooja invalidate
//!
//! # Write to the sheet through the Apps Script web app
//! devpooja write add --file draft.json
//! devpooja write update --id 5 --file draft.json
//! devpooja write delete --id 5
//! ```
//!
//! Logs go to stderr and are filtered with `RUST_LOG`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use devpooja_core::ProductId;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "devpooja_catalog=info,devpooja_cli=info";

#[derive(Parser)]
#[command(name = "devpooja")]
#[command(author, version, about = "DevPooja catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the catalog and report which layer served it
    Load {
        /// Print the loaded catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a product and its related items
    Show {
        /// Product id
        id: ProductId,
    },
    /// List categories, or the products in one category
    Category {
        /// Category key, e.g. `diyas`
        key: Option<String>,
    },
    /// Delete the cached catalog snapshot
    Invalidate,
    /// Write to the product sheet
    Write {
        #[command(subcommand)]
        action: WriteCommand,
    },
}

#[derive(Subcommand)]
enum WriteCommand {
    /// Append a product from a JSON draft
    Add {
        /// Path to the product draft
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Replace a product from a JSON draft
    Update {
        /// Product id
        #[arg(short, long)]
        id: ProductId,

        /// Path to the product draft
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete a product
    Delete {
        /// Product id
        #[arg(short, long)]
        id: ProductId,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Load { json } => commands::catalog::load(json).await?,
        Commands::Show { id } => commands::catalog::show(id).await?,
        Commands::Category { key } => commands::catalog::category(key.as_deref()).await?,
        Commands::Invalidate => commands::cache::invalidate().await?,
        Commands::Write { action } => match action {
            WriteCommand::Add { file } => commands::write::add(&file).await?,
            WriteCommand::Update { id, file } => commands::write::update(id, &file).await?,
            WriteCommand::Delete { id } => commands::write::delete(id).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_write_update() {
        let cli = Cli::try_parse_from(["devpooja", "write", "update", "--id", "5", "--file", "d.json"])
            .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Commands::Write {
                action: WriteCommand::Update { id, file },
            } => {
                assert_eq!(id, ProductId::new(5));
                assert_eq!(file, PathBuf::from("d.json"));
            }
            _ => panic!("expected write update"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_id() {
        assert!(Cli::try_parse_from(["devpooja", "show", "five"]).is_err());
    }
}
