//! geoquery CLI entry point
//!
//! Geocoding lookups and proximity SQL from the command line

use geoquery::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
