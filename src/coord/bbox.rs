//! Bounding boxes around a center point

use super::{Coordinates, Units};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};

/// An axis-aligned latitude/longitude rectangle
///
/// When the box crosses the antimeridian, `sw_lng > ne_lng`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub sw_lat: f64,
    pub sw_lng: f64,
    pub ne_lat: f64,
    pub ne_lng: f64,
}

impl BoundingBox {
    pub fn new(sw: Coordinates, ne: Coordinates) -> Self {
        Self {
            sw_lat: sw.lat,
            sw_lng: sw.lng,
            ne_lat: ne.lat,
            ne_lng: ne.lng,
        }
    }

    pub fn south_west(&self) -> Coordinates {
        Coordinates::new(self.sw_lat, self.sw_lng)
    }

    pub fn north_east(&self) -> Coordinates {
        Coordinates::new(self.ne_lat, self.ne_lng)
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.sw_lng > self.ne_lng
    }

    pub fn contains(&self, point: Coordinates) -> bool {
        if point.lat < self.sw_lat || point.lat > self.ne_lat {
            return false;
        }
        if self.crosses_antimeridian() {
            point.lng >= self.sw_lng || point.lng <= self.ne_lng
        } else {
            point.lng >= self.sw_lng && point.lng <= self.ne_lng
        }
    }

    /// `(sw_lat, sw_lng, ne_lat, ne_lng)`
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.sw_lat, self.sw_lng, self.ne_lat, self.ne_lng)
    }
}

/// Smallest box containing every point within `radius` of `center`
///
/// # Arguments
/// * `center` - Center of the search circle
/// * `radius` - Search radius, in `units`
/// * `units` - Units of `radius`
///
/// # Algorithm
/// The latitude half-height is the angular radius `d/R`. The longitude
/// half-width is `asin(sin(d/R) / cos(lat))`, which is exact on a sphere
/// (a circle's widest longitude is not reached at the center's latitude).
/// Boxes that reach a pole are clamped to ±90° and span every longitude.
/// Boxes that pass ±180° wrap around.
pub fn bounding_box(center: Coordinates, radius: f64, units: Units) -> BoundingBox {
    let angular = radius.max(0.0) / units.earth_radius();
    let lat = center.lat.to_radians();
    let lng = center.lng.to_radians();

    let mut min_lat = lat - angular;
    let mut max_lat = lat + angular;
    let (mut min_lng, mut max_lng);

    if min_lat > -FRAC_PI_2 && max_lat < FRAC_PI_2 {
        let delta = (angular.sin() / lat.cos()).asin();
        min_lng = lng - delta;
        max_lng = lng + delta;
        if min_lng < -PI {
            min_lng += 2.0 * PI;
        }
        if max_lng > PI {
            max_lng -= 2.0 * PI;
        }
    } else {
        min_lat = min_lat.max(-FRAC_PI_2);
        max_lat = max_lat.min(FRAC_PI_2);
        min_lng = -PI;
        max_lng = PI;
    }

    BoundingBox {
        sw_lat: min_lat.to_degrees(),
        sw_lng: min_lng.to_degrees(),
        ne_lat: max_lat.to_degrees(),
        ne_lng: max_lng.to_degrees(),
    }
}
