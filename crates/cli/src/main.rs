//! Fofurices CLI - Catalog and cache tools for operators.
//!
//! # Usage
//!
//! ```bash
//! # Decode a downloaded sheet export and print it as JSON
//! fofurices decode produtos.csv --as products
//!
//! # Fetch both sheets once and write them to the cache
//! fofurices refresh
//!
//! # Inspect or clear the local cache store
//! fofurices cache show cart
//! fofurices cache clear all
//! ```
//!
//! # Commands
//!
//! - `decode` - Decode a CSV file
//! - `refresh` - Run the catalog loader once
//! - `cache show` / `cache clear` - Inspect or reset stored keys

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fofurices_storefront::cache::CacheKey;

mod commands;

use commands::decode::DecodeAs;

#[derive(Parser)]
#[command(name = "fofurices")]
#[command(author, version, about = "Fofurices CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a CSV export and print it as JSON
    Decode {
        /// CSV file to decode
        file: PathBuf,

        /// Shape of the output
        #[arg(long = "as", value_enum, default_value_t = DecodeAs::Records)]
        shape: DecodeAs,
    },
    /// Fetch the catalog once and write it to the cache
    Refresh,
    /// Inspect or reset the local cache store
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Print the stored JSON for a key
    Show {
        /// `products`, `categories`, `cart` or `favorites`
        key: CacheKey,
    },
    /// Remove a key, or every key with `all`
    Clear {
        /// A cache key or `all`
        target: String,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
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
        Commands::Decode { file, shape } => commands::decode::run(&file, shape)?,
        Commands::Refresh => commands::refresh::run().await?,
        Commands::Cache { action } => match action {
            CacheAction::Show { key } => commands::cache::show(key)?,
            CacheAction::Clear { target } => commands::cache::clear(&target)?,
        },
    }
    Ok(())
}
