//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod distance;
pub mod near;
pub mod providers;
pub mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Geocoding lookups and proximity SQL
#[derive(Parser)]
#[command(name = "geoquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log lookup dispatch at info level
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Geocode an address, IP or "lat,lng" pair
    Search(search::SearchArgs),

    /// Build a proximity SQL query around a point
    Near(near::NearArgs),

    /// Distance and bearing between two points
    Distance(distance::DistanceArgs),

    /// List lookups and database backends
    Providers(providers::ProvidersArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search(args) => search::run(args).await,
        Commands::Near(args) => near::run(args).await,
        Commands::Distance(args) => distance::run(args),
        Commands::Providers(args) => providers::run(args),
        Commands::Config(args) => config::run(args),
    }
}
