//! Nominatim lookup (OpenStreetMap)
//!
//! Uses the free Nominatim API for forward and reverse geocoding.
//! Rate limit: 1 request per second; a User-Agent is required.

use crate::constants::api::NOMINATIM_URL;
use crate::error::{Error, Result};
use crate::lookup::{append_params, fetch_json, http_client, GeoResult, Lookup, LookupSettings, ProviderName};
use crate::query::{LookupOptions, Query};
use async_trait::async_trait;
use serde::Deserialize;

/// Nominatim lookup
#[derive(Debug, Clone)]
pub struct Nominatim {
    client: reqwest::Client,
    base_url: String,
    language: Option<String>,
}

/// Nominatim search/reverse response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: Option<String>,
    lon: Option<String>,
    display_name: Option<String>,
    /// Set instead of the other fields when reverse geocoding finds nothing
    error: Option<String>,
}

impl Nominatim {
    /// Create a new Nominatim lookup against the public server
    pub fn new(settings: &LookupSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings)?,
            base_url: NOMINATIM_URL.to_string(),
            language: settings.language.clone(),
        })
    }

    /// Point at a self-hosted Nominatim instance
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Parse lat/lng strings to f64
    fn parse_coords(lat: &str, lng: &str) -> Result<(f64, f64)> {
        let lat: f64 = lat
            .parse()
            .map_err(|_| Error::lookup("nominatim", format!("Invalid latitude: {}", lat)))?;
        let lng: f64 = lng
            .parse()
            .map_err(|_| Error::lookup("nominatim", format!("Invalid longitude: {}", lng)))?;
        Ok((lat, lng))
    }

    fn to_result(item: NominatimResult) -> Result<Option<GeoResult>> {
        if item.error.is_some() {
            return Ok(None);
        }
        let (latitude, longitude) = match (item.lat.as_deref(), item.lon.as_deref()) {
            (Some(lat), Some(lon)) => {
                let (lat, lng) = Self::parse_coords(lat, lon)?;
                (Some(lat), Some(lng))
            }
            _ => (None, None),
        };
        Ok(Some(GeoResult {
            latitude,
            longitude,
            address: item.display_name,
        }))
    }
}

#[async_trait]
impl Lookup for Nominatim {
    fn name(&self) -> ProviderName {
        ProviderName::Nominatim
    }

    async fn search(&self, text: &str, options: &LookupOptions) -> Result<Vec<GeoResult>> {
        let query = Query::with_options(text, options.clone());
        let url = self.query_url(&query);

        // Coordinate-shaped text that fails to parse is searched forward
        if query.coordinates().is_some() {
            let item: Option<NominatimResult> =
                fetch_json(&self.client, self.name(), &url, options.timeout).await?;
            return match item {
                Some(item) => Ok(Self::to_result(item)?.into_iter().collect()),
                None => Ok(Vec::new()),
            };
        }

        let items: Option<Vec<NominatimResult>> =
            fetch_json(&self.client, self.name(), &url, options.timeout).await?;
        let mut results = Vec::new();
        for item in items.unwrap_or_default() {
            if let Some(result) = Self::to_result(item)? {
                results.push(result);
            }
        }
        Ok(results)
    }

    fn query_url(&self, query: &Query) -> String {
        let mut url = match query.coordinates() {
            Some(point) => format!(
                "{}/reverse?format=json&lat={}&lon={}",
                self.base_url, point.lat, point.lng
            ),
            _ => format!(
                "{}/search?format=json&q={}",
                self.base_url,
                urlencoding::encode(&query.sanitized_text())
            ),
        };

        let language = query.options().language.as_ref().or(self.language.as_ref());
        if let Some(language) = language {
            url.push_str("&accept-language=");
            url.push_str(&urlencoding::encode(language));
        }
        append_params(&mut url, query.options());
        url
    }
}
