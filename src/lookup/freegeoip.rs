//! freegeoip IP geolocation lookup
//!
//! Loopback addresses are answered locally with a reserved result instead
//! of being sent to the service.

use crate::constants::api::FREEGEOIP_URL;
use crate::error::Result;
use crate::lookup::{fetch_json, http_client, GeoResult, Lookup, LookupSettings, ProviderName};
use crate::query::{LookupOptions, Query};
use async_trait::async_trait;
use serde::Deserialize;

/// Address reported for loopback queries
const RESERVED_ADDRESS: &str = "Reserved";

/// freegeoip lookup
#[derive(Debug, Clone)]
pub struct FreeGeoIp {
    client: reqwest::Client,
    base_url: String,
}

/// freegeoip response
#[derive(Debug, Deserialize)]
struct FreeGeoIpResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    region_name: Option<String>,
    country_name: Option<String>,
}

impl FreeGeoIp {
    pub fn new(settings: &LookupSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(settings)?,
            base_url: FREEGEOIP_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn reserved_result() -> GeoResult {
        GeoResult::new(0.0, 0.0, RESERVED_ADDRESS)
    }

    fn to_result(data: FreeGeoIpResponse) -> Option<GeoResult> {
        // Build display name from available fields
        let address = [data.city, data.region_name, data.country_name]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        if data.latitude.is_none() && data.longitude.is_none() && address.is_empty() {
            return None;
        }

        Some(GeoResult {
            latitude: data.latitude,
            longitude: data.longitude,
            address: (!address.is_empty()).then_some(address),
        })
    }
}

#[async_trait]
impl Lookup for FreeGeoIp {
    fn name(&self) -> ProviderName {
        ProviderName::Freegeoip
    }

    async fn search(&self, text: &str, options: &LookupOptions) -> Result<Vec<GeoResult>> {
        let query = Query::with_options(text, options.clone());
        if query.is_loopback_ip() {
            return Ok(vec![Self::reserved_result()]);
        }

        let url = self.query_url(&query);
        let data: Option<FreeGeoIpResponse> =
            fetch_json(&self.client, self.name(), &url, options.timeout).await?;
        Ok(data.and_then(Self::to_result).into_iter().collect())
    }

    fn query_url(&self, query: &Query) -> String {
        format!(
            "{}/{}",
            self.base_url,
            urlencoding::encode(&query.sanitized_text())
        )
    }
}
