//! Kiro CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the storefront schema (catalog, cart rows, sessions)
//! kiro-cli migrate
//!
//! # Load the bundled demo catalog
//! kiro-cli seed
//!
//! # Load a catalog from a YAML file
//! kiro-cli seed --file catalog.yaml
//! ```
//!
//! Both commands read `DATABASE_URL` (or `KIRO_DATABASE_URL`), loading a
//! `.env` file first if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kiro-cli")]
#[command(author, version, about = "Kiro storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with categories, products and reviews
    Seed {
        /// YAML catalog to load (defaults to the bundled demo catalog)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(file.as_deref()).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seed_with_file() {
        let cli = Cli::try_parse_from(["kiro-cli", "seed", "--file", "catalog.yaml"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Seed { file: Some(ref path) }) if path == &PathBuf::from("catalog.yaml")
        ));
    }
}
