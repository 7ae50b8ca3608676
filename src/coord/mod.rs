//! Geodesic math
//!
//! This module handles:
//! - Coordinates and distance units
//! - Bounding boxes around a center point
//! - Planar and spherical distance, linear and spherical bearing
//!
//! Every formula is generic over [`Numeric`], so the same code yields a
//! scalar (`f64`) or an SQL expression ([`Expr`]).

pub mod bbox;
pub mod distance;
pub mod expr;

pub use bbox::{bounding_box, BoundingBox};
pub use distance::{
    bearing, latitude_degree_distance, longitude_degree_distance, planar_distance,
    planar_distance_with_scale, quadrant_bearing, spherical_distance, BearingMethod,
};
pub use expr::{Expr, Numeric, Row};

use crate::constants::geo::{EARTH_RADIUS_KM, KM_IN_MI};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.lat.is_finite() || self.lat < -90.0 || self.lat > 90.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || self.lng < -180.0 || self.lng > 180.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Great-circle distance to another point
    pub fn distance_to(&self, other: Coordinates, units: Units) -> f64 {
        spherical_distance(self.lat, self.lng, other.lat, other.lng, units)
    }

    /// Initial compass bearing toward another point, in [0, 360)
    pub fn bearing_to(&self, other: Coordinates, method: BearingMethod) -> f64 {
        bearing(self.lat, self.lng, other.lat, other.lng, method)
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Distance units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Km,
    Mi,
}

impl Units {
    /// Mean Earth radius in these units
    pub fn earth_radius(self) -> f64 {
        self.from_km(EARTH_RADIUS_KM)
    }

    /// Convert a kilometer value into these units
    pub fn from_km(self, km: f64) -> f64 {
        match self {
            Self::Km => km,
            Self::Mi => km * KM_IN_MI,
        }
    }

    /// Convert a value in these units into kilometers
    pub fn to_km(self, value: f64) -> f64 {
        match self {
            Self::Km => value,
            Self::Mi => value / KM_IN_MI,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Km => "km",
            Self::Mi => "mi",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Ok(Self::Km),
            "mi" | "miles" => Ok(Self::Mi),
            _ => Err(format!("Unknown units: {} (expected km or mi)", s)),
        }
    }
}
