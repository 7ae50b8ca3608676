//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::{Config, OneOrMany};
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "lookup.street" or "api_keys.google")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value; empty clears)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        (None, None) => {
            print!("{}", render_config(&config));
        }

        (Some(key), None) => match config.get(key) {
            Some(value) => println!("{}", value),
            None => {
                let keys = Config::available_keys()
                    .iter()
                    .map(|k| format!("  {}", k))
                    .collect::<Vec<_>>()
                    .join("\n");
                return Err(Error::Config(format!(
                    "Unknown config key: {}\n\nAvailable keys:\n{}",
                    key, keys
                )));
            }
        },

        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        (None, Some(_)) => {
            return Err(Error::Config("Must specify a key to set a value".into()));
        }
    }

    Ok(())
}

fn render_names(names: &Option<OneOrMany<String>>) -> String {
    match names {
        None => "# not set".to_string(),
        Some(names) => format!(
            "[{}]",
            names
                .iter()
                .map(|name| format!("\"{}\"", name))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// All configuration values, with API keys masked
fn render_config(config: &Config) -> String {
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    line("[lookup]".into());
    line(format!("street = {}", render_names(&config.lookup.street)));
    line(format!("ip = {}", render_names(&config.lookup.ip)));
    line(format!("timeout_secs = {}", config.lookup.timeout_secs));
    line(format!("user_agent = \"{}\"", config.lookup.user_agent));
    match &config.lookup.language {
        Some(language) => line(format!("language = \"{}\"", language)),
        None => line("language = \"\" # not set".into()),
    }
    line(String::new());

    line("[defaults]".into());
    line(format!("units = \"{}\"", config.defaults.units));
    line(format!("bearing = \"{}\"", config.defaults.bearing));
    line(format!("radius = {}", config.defaults.radius));
    line(String::new());

    line("[api_keys]".into());
    if config.api_keys.is_empty() {
        line("# none configured".into());
    }
    for name in config.api_keys.keys() {
        line(format!("{} = \"***\" # configured", name));
    }

    out
}
