//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/geoquery/config.toml

pub mod defaults;

use crate::constants::http::USER_AGENT;
use crate::coord::Units;
use crate::error::{Error, Result};
use crate::lookup::ProviderName;
use crate::near::parse_bearing;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// A setting that may be written as one value or a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(value) => std::slice::from_ref(value).iter(),
            Self::Many(values) => values.iter(),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    /// Single-element lists collapse to `One`
    fn from(mut values: Vec<T>) -> Self {
        if values.len() == 1 {
            if let Some(value) = values.pop() {
                return Self::One(value);
            }
        }
        Self::Many(values)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Lookup selection and request settings
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Default values for proximity searches
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// API keys, by lookup name
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,
}

/// Lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Street lookup(s) to use instead of the first built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<OneOrMany<String>>,

    /// IP lookup(s) to use instead of the first built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<OneOrMany<String>>,

    /// Per-lookup timeout in seconds; 0 waits indefinitely
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent to lookup services
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Preferred result language, for services that support one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Default values for proximity searches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Distance units ("km" or "mi")
    #[serde(default = "default_units")]
    pub units: String,

    /// Bearing method ("linear", "spherical" or "false")
    #[serde(default = "default_bearing")]
    pub bearing: String,

    /// Search radius, in `units`
    #[serde(default = "default_radius")]
    pub radius: f64,
}

// Default value functions for serde
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    USER_AGENT.to_string()
}
fn default_units() -> String {
    DEFAULT_UNITS.to_string()
}
fn default_bearing() -> String {
    DEFAULT_BEARING.to_string()
}
fn default_radius() -> f64 {
    DEFAULT_RADIUS
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            street: None,
            ip: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            language: None,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            units: default_units(),
            bearing: default_bearing(),
            radius: default_radius(),
        }
    }
}

/// Parse every configured name, failing on the first unknown one
fn parse_names(names: Option<&OneOrMany<String>>) -> Result<Vec<ProviderName>> {
    names
        .map(|names| names.iter().map(|name| name.parse()).collect())
        .unwrap_or_else(|| Ok(Vec::new()))
}

/// Parse a comma-separated list of lookup names for `set`
fn parse_name_list(value: &str) -> Result<Option<OneOrMany<String>>> {
    let names = value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.parse::<ProviderName>().map(|name| name.to_string()))
        .collect::<Result<Vec<_>>>()?;
    Ok((!names.is_empty()).then(|| OneOrMany::from(names)))
}

fn join_names(names: &Option<OneOrMany<String>>) -> String {
    names
        .as_ref()
        .map(|names| names.iter().cloned().collect::<Vec<_>>().join(", "))
        .unwrap_or_default()
}

impl LookupConfig {
    /// Configured street lookups, parsed
    pub fn street_providers(&self) -> Result<Vec<ProviderName>> {
        parse_names(self.street.as_ref())
    }

    /// Configured IP lookups, parsed
    pub fn ip_providers(&self) -> Result<Vec<ProviderName>> {
        parse_names(self.ip.as_ref())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"; API keys are "api_keys.<lookup>".
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["lookup", "street"] => Some(join_names(&self.lookup.street)),
            ["lookup", "ip"] => Some(join_names(&self.lookup.ip)),
            ["lookup", "timeout_secs"] => Some(self.lookup.timeout_secs.to_string()),
            ["lookup", "user_agent"] => Some(self.lookup.user_agent.clone()),
            ["lookup", "language"] => Some(self.lookup.language.clone().unwrap_or_default()),

            ["defaults", "units"] => Some(self.defaults.units.clone()),
            ["defaults", "bearing"] => Some(self.defaults.bearing.clone()),
            ["defaults", "radius"] => Some(self.defaults.radius.to_string()),

            ["api_keys", name] => {
                let name = name.parse::<ProviderName>().ok()?;
                self.api_keys.get(name.as_str()).cloned()
            }

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong. An empty
    /// value clears optional settings.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["lookup", "street"] => {
                self.lookup.street = parse_name_list(value)?;
            }
            ["lookup", "ip"] => {
                self.lookup.ip = parse_name_list(value)?;
            }
            ["lookup", "timeout_secs"] => {
                self.lookup.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }
            ["lookup", "user_agent"] => {
                self.lookup.user_agent = value.to_string();
            }
            ["lookup", "language"] => {
                self.lookup.language = (!value.is_empty()).then(|| value.to_string());
            }

            ["defaults", "units"] => {
                let units: Units = value.parse().map_err(Error::Config)?;
                self.defaults.units = units.to_string();
            }
            ["defaults", "bearing"] => {
                self.defaults.bearing = match parse_bearing(value)? {
                    Some(method) => method.to_string(),
                    None => "false".to_string(),
                };
            }
            ["defaults", "radius"] => {
                let radius: f64 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid radius value: {}", value))
                })?;
                if !radius.is_finite() || radius < 0.0 {
                    return Err(Error::Config(format!("Invalid radius value: {}", value)));
                }
                self.defaults.radius = radius;
            }

            ["api_keys", name] => {
                let name = name.parse::<ProviderName>()?;
                if value.is_empty() {
                    self.api_keys.remove(name.as_str());
                } else {
                    self.api_keys.insert(name.to_string(), value.to_string());
                }
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "lookup.street",
            "lookup.ip",
            "lookup.timeout_secs",
            "lookup.user_agent",
            "lookup.language",
            "defaults.units",
            "defaults.bearing",
            "defaults.radius",
            "api_keys.<lookup>",
        ]
    }
}
