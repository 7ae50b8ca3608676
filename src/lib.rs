//! geoquery: geocoding lookups and proximity SQL
//!
//! A library and CLI tool that sends a free-text query to a configurable
//! chain of geocoding services, and builds SQL for "rows within N units of
//! a point" searches on databases with or without trigonometric functions.
//!
//! ## Features
//!
//! - 29 named lookups (street and IP), constructed lazily and cached
//! - Query classification: blank, IP address, loopback, `lat,lng` pair
//! - First-non-empty-result dispatch with per-call timeouts
//! - Planar and great-circle distance, linear/spherical/quadrant bearing
//! - Proximity SQL for SQLite, PostgreSQL and MySQL
//!
//! ## Quick Start
//!
//! ```rust
//! use geoquery::near::{Collection, NearOptions, Postgres, ProximityQueryBuilder};
//! use geoquery::Coordinates;
//!
//! let venues = Collection::new("venues");
//! let center = Coordinates::new(40.7128, -74.0060); // NYC
//!
//! let spec = ProximityQueryBuilder::new(&venues, &Postgres)
//!     .build(Some(center), Some(5.0), &NearOptions::default());
//! println!("{}", spec.to_sql());
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod geocoder;
pub mod lookup;
pub mod near;
pub mod query;

// Re-export commonly used types
pub use config::Config;
pub use coord::{BearingMethod, BoundingBox, Coordinates, Units};
pub use error::{Error, Result};
pub use geocoder::Geocoder;
pub use lookup::{GeoResult, Lookup, ProviderName, Registry};
pub use near::{Collection, NearOptions, ProximityQueryBuilder, ProximitySpec};
pub use query::{LookupOptions, Query};
