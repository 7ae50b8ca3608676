//! High-level geocoding API
//!
//! Ties the registry, the dispatcher and the proximity builder together
//! behind a few calls: search, coordinates, address, and near.

use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::lookup::{GeoResult, Registry};
use crate::near::{Backend, Collection, NearDefaults, NearOptions, ProximityQueryBuilder, ProximitySpec};
use crate::query::{Dispatcher, LookupOptions, Query, QueryText};
use tracing::debug;

/// Geocoder over a lookup registry
#[derive(Debug, Default)]
pub struct Geocoder {
    registry: Registry,
    defaults: NearDefaults,
}

impl Geocoder {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            defaults: NearDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: NearDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Registry::from_config(config)?).with_defaults(NearDefaults::from_config(config)?))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn defaults(&self) -> NearDefaults {
        self.defaults
    }

    /// Look up `text`; blank input yields no results without calling anything
    pub async fn search(
        &self,
        text: impl Into<QueryText>,
        options: LookupOptions,
    ) -> Result<Vec<GeoResult>> {
        self.search_query(&Query::with_options(text, options)).await
    }

    pub async fn search_query(&self, query: &Query) -> Result<Vec<GeoResult>> {
        if query.is_blank() {
            debug!("Blank query, skipping lookups");
            return Ok(Vec::new());
        }
        Dispatcher::new(&self.registry).execute(query).await
    }

    /// Coordinates of the first result for `text`
    pub async fn coordinates(&self, text: &str) -> Result<Option<Coordinates>> {
        let results = self.search(text, LookupOptions::default()).await?;
        Ok(results.first().and_then(GeoResult::coordinates))
    }

    /// Address of the first result for `point`
    pub async fn address(&self, point: Coordinates) -> Result<Option<String>> {
        let results = self.search(point, LookupOptions::default()).await?;
        Ok(results.into_iter().next().and_then(|result| result.address))
    }

    /// Proximity query around `location`
    ///
    /// Coordinate pairs are used as given; anything else is geocoded first.
    /// A location that cannot be resolved yields a query matching no rows.
    pub async fn near(
        &self,
        location: impl Into<QueryText>,
        radius: Option<f64>,
        options: &NearOptions,
        collection: &Collection,
        backend: &dyn Backend,
    ) -> Result<ProximitySpec> {
        let query = Query::new(location);
        let center = match query.coordinates() {
            Some(point) => Some(point),
            None if query.is_blank() => None,
            None => {
                let results = self.search_query(&query).await?;
                results.first().and_then(GeoResult::coordinates)
            }
        };

        Ok(ProximityQueryBuilder::new(collection, backend)
            .with_defaults(self.defaults)
            .build(center, radius, options))
    }
}
