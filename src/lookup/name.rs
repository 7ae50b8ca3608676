//! Lookup service names
//!
//! The set of lookups is closed: every name is a variant of [`ProviderName`]
//! and the registry maps each variant to an adapter constructor.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a geocoding or IP-geolocation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderName {
    Dstk,
    Esri,
    Google,
    GooglePremier,
    GooglePlacesDetails,
    Yahoo,
    Bing,
    GeocoderCa,
    GeocoderUs,
    Yandex,
    Nominatim,
    Mapquest,
    Opencagedata,
    Ovi,
    Here,
    Baidu,
    Geocodio,
    SmartyStreets,
    Okf,
    PostcodeAnywhereUk,
    Test,
    BaiduIp,
    Freegeoip,
    Geoip2,
    Maxmind,
    MaxmindLocal,
    Telize,
    Pointpin,
    MaxmindGeoip2,
}

/// Street address lookups, default first
pub const STREET_PROVIDERS: [ProviderName; 21] = [
    ProviderName::Dstk,
    ProviderName::Esri,
    ProviderName::Google,
    ProviderName::GooglePremier,
    ProviderName::GooglePlacesDetails,
    ProviderName::Yahoo,
    ProviderName::Bing,
    ProviderName::GeocoderCa,
    ProviderName::GeocoderUs,
    ProviderName::Yandex,
    ProviderName::Nominatim,
    ProviderName::Mapquest,
    ProviderName::Opencagedata,
    ProviderName::Ovi,
    ProviderName::Here,
    ProviderName::Baidu,
    ProviderName::Geocodio,
    ProviderName::SmartyStreets,
    ProviderName::Okf,
    ProviderName::PostcodeAnywhereUk,
    ProviderName::Test,
];

/// IP address lookups, default first
pub const IP_PROVIDERS: [ProviderName; 8] = [
    ProviderName::BaiduIp,
    ProviderName::Freegeoip,
    ProviderName::Geoip2,
    ProviderName::Maxmind,
    ProviderName::MaxmindLocal,
    ProviderName::Telize,
    ProviderName::Pointpin,
    ProviderName::MaxmindGeoip2,
];

impl ProviderName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dstk => "dstk",
            Self::Esri => "esri",
            Self::Google => "google",
            Self::GooglePremier => "google_premier",
            Self::GooglePlacesDetails => "google_places_details",
            Self::Yahoo => "yahoo",
            Self::Bing => "bing",
            Self::GeocoderCa => "geocoder_ca",
            Self::GeocoderUs => "geocoder_us",
            Self::Yandex => "yandex",
            Self::Nominatim => "nominatim",
            Self::Mapquest => "mapquest",
            Self::Opencagedata => "opencagedata",
            Self::Ovi => "ovi",
            Self::Here => "here",
            Self::Baidu => "baidu",
            Self::Geocodio => "geocodio",
            Self::SmartyStreets => "smarty_streets",
            Self::Okf => "okf",
            Self::PostcodeAnywhereUk => "postcode_anywhere_uk",
            Self::Test => "test",
            Self::BaiduIp => "baidu_ip",
            Self::Freegeoip => "freegeoip",
            Self::Geoip2 => "geoip2",
            Self::Maxmind => "maxmind",
            Self::MaxmindLocal => "maxmind_local",
            Self::Telize => "telize",
            Self::Pointpin => "pointpin",
            Self::MaxmindGeoip2 => "maxmind_geoip2",
        }
    }

    /// Adapter type name, e.g. `google_premier` → `GooglePremier`
    pub fn class_name(self) -> String {
        classify_name(self.as_str())
    }

    pub fn is_ip(self) -> bool {
        IP_PROVIDERS.contains(&self)
    }

    /// Every lookup, street lookups first
    pub fn all() -> impl Iterator<Item = ProviderName> {
        STREET_PROVIDERS.into_iter().chain(IP_PROVIDERS)
    }

    /// Every lookup except the `test` pseudo-lookup
    pub fn all_except_test() -> impl Iterator<Item = ProviderName> {
        Self::all().filter(|name| *name != Self::Test)
    }

    /// Comma-separated list of every valid name, for error messages
    pub fn valid_names() -> String {
        Self::all()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderName {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::all()
            .find(|name| name.as_str() == wanted)
            .ok_or_else(|| Error::UnknownLookup {
                name: value.to_string(),
                valid: Self::valid_names(),
            })
    }
}

/// Convert an underscored name into its type name
///
/// Splits on `_`, upper-cases the first letter of each segment and joins
/// the segments: `smarty_streets` → `SmartyStreets`.
pub fn classify_name(name: &str) -> String {
    name.split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_name() {
        assert_eq!(classify_name("google"), "Google");
        assert_eq!(classify_name("google_premier"), "GooglePremier");
        assert_eq!(classify_name("postcode_anywhere_uk"), "PostcodeAnywhereUk");
        assert_eq!(classify_name("maxmind_geoip2"), "MaxmindGeoip2");
        assert_eq!(classify_name(""), "");
    }

    #[test]
    fn test_class_name_matches_variant_for_every_name() {
        for name in ProviderName::all() {
            assert_eq!(name.class_name(), format!("{:?}", name));
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for name in ProviderName::all() {
            assert_eq!(name.as_str().parse::<ProviderName>().unwrap(), name);
        }
        assert_eq!(" Nominatim ".parse::<ProviderName>().unwrap(), ProviderName::Nominatim);
    }

    #[test]
    fn test_serde_names_match_as_str() {
        for name in ProviderName::all() {
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, format!("\"{}\"", name.as_str()));
        }
    }

    #[test]
    fn test_unknown_name_lists_valid_names() {
        let err = "mapbox".parse::<ProviderName>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("\"mapbox\""));
        for name in ProviderName::all() {
            assert!(message.contains(name.as_str()), "missing {}", name);
        }
    }

    #[test]
    fn test_partition() {
        assert!(ProviderName::Freegeoip.is_ip());
        assert!(!ProviderName::Google.is_ip());
        assert!(!ProviderName::Test.is_ip());
        assert_eq!(ProviderName::all().count(), 29);
        assert_eq!(ProviderName::all_except_test().count(), 28);
        assert!(!ProviderName::all_except_test().any(|n| n == ProviderName::Test));
    }
}
