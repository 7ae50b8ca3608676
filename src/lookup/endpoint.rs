//! Endpoint-only lookups
//!
//! Services without a bundled response translator. They know where their
//! requests go, so `query_url` works for diagnostics, but `search` fails
//! with [`Error::UnsupportedLookup`] until a caller registers a real
//! adapter for the name.

use crate::error::{Error, Result};
use crate::lookup::{append_params, GeoResult, Lookup, LookupSettings, ProviderName};
use crate::query::{LookupOptions, Query};
use async_trait::async_trait;

/// Request URL template for `name`; `None` for lookups backed by a local
/// database file
///
/// Placeholders: `{query}` (URL-encoded query text, `lat,lng` for reverse
/// queries) and `{key}` (API key).
fn endpoint(name: ProviderName) -> Option<&'static str> {
    use ProviderName::*;

    let template = match name {
        Dstk => "http://www.datasciencetoolkit.org/maps/api/geocode/json?address={query}",
        Esri => "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer/find?f=pjson&text={query}",
        Google => "https://maps.googleapis.com/maps/api/geocode/json?address={query}&key={key}",
        GooglePremier => "https://maps.googleapis.com/maps/api/geocode/json?address={query}&client={key}",
        GooglePlacesDetails => "https://maps.googleapis.com/maps/api/place/details/json?placeid={query}&key={key}",
        Yahoo => "https://yboss.yahooapis.com/geo/placefinder?flags=JXTSR&location={query}",
        Bing => "https://dev.virtualearth.net/REST/v1/Locations?q={query}&key={key}",
        GeocoderCa => "https://geocoder.ca/?json=1&locate={query}&auth={key}",
        GeocoderUs => "https://geocoder.us/member/service/csv/geocode?address={query}",
        Yandex => "https://geocode-maps.yandex.ru/1.x/?format=json&geocode={query}&apikey={key}",
        Nominatim => "https://nominatim.openstreetmap.org/search?format=json&q={query}",
        Mapquest => "https://www.mapquestapi.com/geocoding/v1/address?location={query}&key={key}",
        Opencagedata => "https://api.opencagedata.com/geocode/v1/json?q={query}&key={key}",
        Ovi => "https://lbs.ovi.com/search/6.2/geocode.json?searchtext={query}",
        Here => "https://geocoder.api.here.com/6.2/geocode.json?searchtext={query}&apiKey={key}",
        Baidu => "https://api.map.baidu.com/geocoder/v2/?output=json&address={query}&ak={key}",
        Geocodio => "https://api.geocod.io/v1/geocode?q={query}&api_key={key}",
        SmartyStreets => "https://api.smartystreets.com/street-address?street={query}&auth-token={key}",
        Okf => "https://data.okf.fi/gis/1/geocode/json?address={query}",
        PostcodeAnywhereUk => "https://services.postcodeanywhere.co.uk/Geocoding/UK/Geocode/v2.10/json.ws?Location={query}&Key={key}",
        Test => "test://{query}",
        BaiduIp => "https://api.map.baidu.com/location/ip?ip={query}&ak={key}&coor=bd09ll",
        Freegeoip => "https://freegeoip.app/json/{query}",
        Maxmind => "https://geoip.maxmind.com/f?l={key}&i={query}",
        Telize => "https://telize-v1.p.rapidapi.com/location/{query}",
        Pointpin => "https://geo.pointp.in/{key}/json/{query}",
        MaxmindGeoip2 => "https://geoip.maxmind.com/geoip/v2.1/city/{query}",
        Geoip2 | MaxmindLocal => return None,
    };
    Some(template)
}

/// A lookup that knows its endpoint but not its response format
#[derive(Debug, Clone)]
pub struct EndpointLookup {
    name: ProviderName,
    api_key: Option<String>,
}

impl EndpointLookup {
    pub fn new(name: ProviderName, settings: &LookupSettings) -> Self {
        Self {
            name,
            api_key: settings.api_key(name).map(str::to_string),
        }
    }

    /// Whether requests go to a remote service rather than a local database
    pub fn is_remote(&self) -> bool {
        endpoint(self.name).is_some()
    }
}

#[async_trait]
impl Lookup for EndpointLookup {
    fn name(&self) -> ProviderName {
        self.name
    }

    async fn search(&self, _text: &str, _options: &LookupOptions) -> Result<Vec<GeoResult>> {
        Err(Error::UnsupportedLookup(self.name.to_string()))
    }

    /// Empty for local-database lookups, which make no request
    fn query_url(&self, query: &Query) -> String {
        let Some(template) = endpoint(self.name) else {
            return String::new();
        };

        let mut url = template
            .replace("{query}", &urlencoding::encode(&query.sanitized_text()))
            .replace(
                "{key}",
                &urlencoding::encode(self.api_key.as_deref().unwrap_or_default()),
            );
        append_params(&mut url, query.options());
        url
    }
}
