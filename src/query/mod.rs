//! Lookup queries
//!
//! A [`Query`] wraps the raw input (free text, an IP address, or a
//! coordinate pair) and the per-call options. Classification is pure: the
//! IP shape is checked before the coordinate shape, and anything matching
//! neither is treated as a street address.

pub mod dispatch;

pub use dispatch::Dispatcher;

use crate::coord::Coordinates;
use crate::error::Result;
use crate::lookup::{ProviderName, Registry};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use std::time::Duration;

/// IPv4 shape, optionally in IPv4-mapped IPv6 form
///
/// Octets are not range checked: `999.999.999.999` is accepted, and lookup
/// services do their own validation.
fn ip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(::ffff:)?([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})$")
            .expect("IP pattern is valid")
    })
}

/// `<number>,<number>` with optional minus signs and free spacing after the comma
fn coordinate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^-?[0-9.]+,\s*-?[0-9.]+$")
            .expect("coordinate pattern is valid")
    })
}

fn comma_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\s*,\s*").expect("comma pattern is valid")
    })
}

/// Raw query input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryText {
    Text(String),
    /// `[lat, lng]`; entries may be missing
    Array(Vec<Option<f64>>),
}

impl QueryText {
    fn non_null_len(values: &[Option<f64>]) -> usize {
        values.iter().filter(|v| v.is_some()).count()
    }
}

impl From<&str> for QueryText {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for QueryText {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Coordinates> for QueryText {
    fn from(point: Coordinates) -> Self {
        Self::Array(vec![Some(point.lat), Some(point.lng)])
    }
}

impl From<(f64, f64)> for QueryText {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::Array(vec![Some(lat), Some(lng)])
    }
}

impl From<Vec<Option<f64>>> for QueryText {
    fn from(values: Vec<Option<f64>>) -> Self {
        Self::Array(values)
    }
}

impl fmt::Display for QueryText {
    /// Arrays render comma-joined, missing entries as empty strings
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Array(values) => {
                let parts: Vec<String> = values
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default())
                    .collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

/// Per-call lookup options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupOptions {
    /// Extra request parameters passed through to the lookup service
    ///
    /// Their presence alone keeps an otherwise blank query from being blank.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Overrides the registry's per-call timeout
    #[serde(default)]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub language: Option<String>,
}

impl LookupOptions {
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Result of classifying a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub is_blank: bool,
    pub is_ip_address: bool,
    pub is_loopback: bool,
    pub is_coordinate_pair: bool,
}

/// A location query
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: QueryText,
    options: LookupOptions,
}

impl Query {
    pub fn new(text: impl Into<QueryText>) -> Self {
        Self::with_options(text, LookupOptions::default())
    }

    pub fn with_options(text: impl Into<QueryText>, options: LookupOptions) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }

    pub fn text(&self) -> &QueryText {
        &self.text
    }

    pub fn options(&self) -> &LookupOptions {
        &self.options
    }

    pub fn classify(&self) -> Classification {
        let is_ip_address = self.is_ip_address();
        Classification {
            is_blank: self.is_blank(),
            is_ip_address,
            is_loopback: is_ip_address && self.is_loopback_ip(),
            is_coordinate_pair: !is_ip_address && self.is_coordinates(),
        }
    }

    /// Nothing to look up and no extra parameters to send
    pub fn is_blank(&self) -> bool {
        if !self.options.params.is_empty() {
            return false;
        }
        match &self.text {
            QueryText::Array(values) => QueryText::non_null_len(values) < 2,
            QueryText::Text(text) => text.trim().is_empty(),
        }
    }

    pub fn is_ip_address(&self) -> bool {
        ip_pattern().is_match(&self.text.to_string())
    }

    /// `0.0.0.0` or an address starting with `127`
    pub fn is_loopback_ip(&self) -> bool {
        let text = self.text.to_string();
        self.is_ip_address() && (text == "0.0.0.0" || text.starts_with("127"))
    }

    pub fn is_coordinates(&self) -> bool {
        match &self.text {
            QueryText::Array(values) => values.len() == 2,
            QueryText::Text(text) => coordinate_pattern().is_match(text),
        }
    }

    /// Reverse geocoding resolves coordinates to an address
    pub fn is_reverse(&self) -> bool {
        !self.is_ip_address() && self.is_coordinates()
    }

    /// The text sent to lookups
    ///
    /// Coordinate pairs are rewritten as `lat,lng` with no spacing; other
    /// input passes through unchanged.
    pub fn sanitized_text(&self) -> String {
        let text = self.text.to_string();
        if self.is_coordinates() {
            comma_pattern().split(text.trim()).collect::<Vec<_>>().join(",")
        } else {
            text
        }
    }

    /// The coordinate pair of a reverse query
    pub fn coordinates(&self) -> Option<Coordinates> {
        if !self.is_reverse() {
            return None;
        }
        match &self.text {
            QueryText::Array(values) => match values.as_slice() {
                [Some(lat), Some(lng)] => Some(Coordinates::new(*lat, *lng)),
                _ => None,
            },
            QueryText::Text(_) => {
                let sanitized = self.sanitized_text();
                let (lat, lng) = sanitized.split_once(',')?;
                Some(Coordinates::new(lat.parse().ok()?, lng.parse().ok()?))
            }
        }
    }

    /// Lookups to try, in order
    ///
    /// IP queries use the configured IP lookups, else the first built-in IP
    /// lookup; everything else does the same with street lookups.
    pub fn select_providers(&self, registry: &Registry) -> Vec<ProviderName> {
        let (configured, builtins) = if self.is_ip_address() {
            (registry.configured_ip(), registry.ip_providers())
        } else {
            (registry.configured_street(), registry.street_providers())
        };

        if configured.is_empty() {
            builtins.into_iter().take(1).collect()
        } else {
            configured.to_vec()
        }
    }

    /// Request URL of the first lookup this query would try
    pub fn url(&self, registry: &Registry) -> Result<Option<String>> {
        match self.select_providers(registry).first() {
            Some(name) => Ok(Some(registry.get(*name)?.query_url(self))),
            None => Ok(None),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.text.fmt(f)
    }
}
