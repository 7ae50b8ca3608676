//! Lookup services
//!
//! A lookup translates a query into a request against one geocoding or
//! IP-geolocation service and returns results in a common shape.
//!
//! ## Flex Point
//! Adding a bundled lookup requires:
//! 1. Create `src/lookup/{name}.rs` implementing [`Lookup`]
//! 2. Add `pub mod {name};` below
//! 3. Map its [`ProviderName`] to the constructor in `registry::default_adapter`
//!
//! Callers can also install their own adapters at runtime through
//! [`RegistryBuilder::adapter`] or [`RegistryBuilder::factory`].

pub mod endpoint;
pub mod freegeoip;
pub mod name;
pub mod nominatim;
pub mod registry;
pub mod stub;

pub use name::{classify_name, ProviderName, IP_PROVIDERS, STREET_PROVIDERS};
pub use registry::{merge_providers, LookupFactory, Registry, RegistryBuilder};
pub use stub::TestLookup;

use crate::config::Config;
use crate::constants::http::USER_AGENT;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::query::{LookupOptions, Query};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A single lookup result
///
/// Partially populated results are legal: reverse geocoding may yield only
/// an address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl GeoResult {
    pub fn new(lat: f64, lng: f64, address: impl Into<String>) -> Self {
        Self {
            latitude: Some(lat),
            longitude: Some(lng),
            address: Some(address.into()),
        }
    }

    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    /// Coordinates, if both latitude and longitude are present
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

/// Contract every lookup adapter implements
#[async_trait]
pub trait Lookup: Send + Sync {
    fn name(&self) -> ProviderName;

    /// Search for `text` (an address, an IP, or a `lat,lng` pair)
    ///
    /// An empty list means "nothing found"; the dispatcher then tries the
    /// next lookup. Errors are returned to the caller as-is.
    async fn search(&self, text: &str, options: &LookupOptions) -> Result<Vec<GeoResult>>;

    /// URL of the outbound request for `query`, for diagnostics
    fn query_url(&self, query: &Query) -> String;
}

/// Settings shared by every adapter the registry constructs
#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub api_keys: HashMap<ProviderName, String>,
    /// Per-call timeout, unless the query's options carry their own
    pub timeout: Option<Duration>,
    pub user_agent: String,
    pub language: Option<String>,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            timeout: None,
            user_agent: USER_AGENT.to_string(),
            language: None,
        }
    }
}

impl LookupSettings {
    /// Build settings from the `[lookup]` and `[api_keys]` config sections
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut api_keys = HashMap::new();
        for (name, key) in &config.api_keys {
            api_keys.insert(name.parse::<ProviderName>()?, key.clone());
        }

        let timeout = match config.lookup.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            api_keys,
            timeout,
            user_agent: config.lookup.user_agent.clone(),
            language: config.lookup.language.clone(),
        })
    }

    pub fn api_key(&self, name: ProviderName) -> Option<&str> {
        self.api_keys.get(&name).map(String::as_str)
    }
}

/// Build the HTTP client adapters share
pub(crate) fn http_client(settings: &LookupSettings) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(settings.user_agent.clone());
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// GET a JSON document
///
/// Returns `None` on 404 so adapters can report "not found" as no results.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    provider: ProviderName,
    url: &str,
    timeout: Option<Duration>,
) -> Result<Option<T>> {
    let mut request = client.get(url);
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|e| Error::lookup(provider.as_str(), format!("request failed: {}", e)))?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !response.status().is_success() {
        return Err(Error::lookup(
            provider.as_str(),
            format!("returned status: {}", response.status()),
        ));
    }

    let body = response
        .json()
        .await
        .map_err(|e| Error::lookup(provider.as_str(), format!("failed to parse response: {}", e)))?;
    Ok(Some(body))
}

/// Append extra URL parameters in key order
pub(crate) fn append_params(url: &mut String, options: &LookupOptions) {
    for (key, value) in &options.params {
        url.push('&');
        url.push_str(&urlencoding::encode(key));
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }
}
