//! Search command handler
//!
//! Runs a query through the configured lookups and prints the results.

use crate::config::Config;
use crate::error::Result;
use crate::geocoder::Geocoder;
use crate::lookup::GeoResult;
use crate::query::{LookupOptions, Query};
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Address, IP address or "lat,lng" pair
    pub text: String,

    /// Print the request URL of the first lookup instead of searching
    #[arg(long)]
    pub url: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Per-lookup timeout in seconds, 0 for none (overrides config)
    #[arg(long, short = 't')]
    pub timeout: Option<u64>,

    /// Extra request parameter, as key=value (repeatable)
    #[arg(long = "param", short = 'p', value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

fn parse_param(value: &str) -> std::result::Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", value))
}

/// Apply `--timeout` on top of the loaded config
fn override_timeout(mut config: Config, timeout: Option<u64>) -> Config {
    if let Some(secs) = timeout {
        config.lookup.timeout_secs = secs;
    }
    config
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    let config = override_timeout(Config::load()?, args.timeout);
    let geocoder = Geocoder::from_config(&config)?;

    let mut options = LookupOptions {
        language: config.lookup.language.clone(),
        ..LookupOptions::default()
    };
    for (key, value) in args.params {
        options = options.with_param(key, value);
    }

    let query = Query::with_options(args.text.as_str(), options);

    if args.url {
        match query.url(geocoder.registry())? {
            Some(url) if !url.is_empty() => println!("{}", url),
            _ => eprintln!("No request URL for '{}'", query),
        }
        return Ok(());
    }

    let results = geocoder.search_query(&query).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        eprintln!("No results for '{}'", query);
    } else {
        for result in &results {
            println!("{}", format_result(result));
        }
    }

    Ok(())
}

fn format_result(result: &GeoResult) -> String {
    match (result.coordinates(), &result.address) {
        (Some(point), Some(address)) => format!("{:.6}, {:.6}  {}", point.lat, point.lng, address),
        (Some(point), None) => format!("{:.6}, {:.6}", point.lat, point.lng),
        (None, Some(address)) => address.clone(),
        (None, None) => "(empty result)".to_string(),
    }
}
