//! Centralized constants for the geoquery crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6_371.0;

    /// Miles in one kilometer
    pub const KM_IN_MI: f64 = 0.621_371_192;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// freegeoip IP geolocation API
    pub const FREEGEOIP_URL: &str = "https://freegeoip.app/json";
}

/// HTTP settings
pub mod http {
    /// User agent sent to lookup services that require one
    pub const USER_AGENT: &str = concat!("geoquery/", env!("CARGO_PKG_VERSION"));
}
