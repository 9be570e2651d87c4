//! Foodcart CLI - Database migrations and operational tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! foodcart-cli migrate
//!
//! # Seed demo catalogue data (restaurants, products, menu)
//! foodcart-cli seed
//!
//! # Inspect the geocode cache
//! foodcart-cli geocode list
//!
//! # Resolve an address through the cache (populates on miss)
//! foodcart-cli geocode resolve "Moscow, Tverskaya St 7"
//!
//! # Drop a cached record so the provider is asked again next time
//! foodcart-cli geocode forget "Moscow, Tverskaya St 7"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed database with demo catalogue data
//! - `geocode` - Inspect and manage cached geocode records

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "foodcart-cli")]
#[command(author, version, about = "Foodcart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo catalogue data
    Seed,
    /// Inspect and manage the geocode cache
    Geocode {
        #[command(subcommand)]
        action: GeocodeAction,
    },
}

#[derive(Subcommand)]
enum GeocodeAction {
    /// List cached geocode records
    List,
    /// Resolve an address through the cache (populates on miss)
    Resolve {
        /// Address exactly as it appears on orders or restaurants
        address: String,
    },
    /// Delete a cached record so the provider is asked again next time
    Forget {
        /// Address exactly as it was cached
        address: String,
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Geocode { action } => match action {
            GeocodeAction::List => commands::geocode::list().await?,
            GeocodeAction::Resolve { address } => commands::geocode::resolve(&address).await?,
            GeocodeAction::Forget { address } => commands::geocode::forget(&address).await?,
        },
    }
    Ok(())
}
