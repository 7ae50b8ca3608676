//! Providers command handler
//!
//! Lists the lookups the registry knows and the supported databases.

use crate::config::Config;
use crate::error::Result;
use crate::lookup::{ProviderName, Registry};
use crate::near::available_backends;
use clap::Args;

/// Providers command arguments
#[derive(Args)]
pub struct ProvidersArgs {
    /// Only list lookups named in the config
    #[arg(long)]
    pub configured: bool,
}

/// One listing line: name, adapter type, and a `*` for configured lookups
fn describe(name: ProviderName, configured: &[ProviderName]) -> String {
    let marker = if configured.contains(&name) { "*" } else { " " };
    format!("{} {:22} {}", marker, name.as_str(), name.class_name())
}

/// Run the providers command
pub fn run(args: ProvidersArgs) -> Result<()> {
    let config = Config::load()?;
    let registry = Registry::from_config(&config)?;

    let sections = [
        ("Street lookups", registry.street_providers(), registry.configured_street()),
        ("IP lookups", registry.ip_providers(), registry.configured_ip()),
    ];

    for (title, names, configured) in sections {
        println!("{}:", title);
        for name in names {
            if args.configured && !configured.contains(&name) {
                continue;
            }
            println!("  {}", describe(name, configured));
        }
        println!();
    }

    println!("Database backends:");
    for backend in available_backends() {
        println!("  {:8} - {}", backend.name, backend.description);
    }

    Ok(())
}
