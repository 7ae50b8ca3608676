//! Distance and bearing formulas
//!
//! Each formula is generic over [`Numeric`]: call it with `f64` arguments to
//! get a number, or with [`Expr`](super::Expr) arguments to get the SQL that
//! computes the same value inside a database.

use super::expr::Numeric;
use super::Units;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How bearings are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BearingMethod {
    /// Flat-plane approximation
    Linear,
    /// Initial great-circle bearing
    Spherical,
}

impl std::fmt::Display for BearingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Spherical => write!(f, "spherical"),
        }
    }
}

impl std::str::FromStr for BearingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "spherical" => Ok(Self::Spherical),
            _ => Err(format!("Unknown bearing method: {}", s)),
        }
    }
}

/// Distance spanned by one degree of latitude
pub fn latitude_degree_distance(units: Units) -> f64 {
    2.0 * PI * units.earth_radius() / 360.0
}

/// Distance spanned by one degree of longitude at the given latitude
pub fn longitude_degree_distance(lat: f64, units: Units) -> f64 {
    latitude_degree_distance(units) * lat.to_radians().cos()
}

/// Flat-plane distance with an explicit longitude scale factor
///
/// `lon_scale` is the cosine of the latitude at which a degree of longitude
/// is measured. Backends without trigonometric functions pass a literal
/// computed from the search center.
pub fn planar_distance_with_scale<N: Numeric>(
    lat1: N,
    lon1: N,
    lat2: N,
    lon2: N,
    lon_scale: N,
    units: Units,
) -> N {
    let per_degree = N::lit(latitude_degree_distance(units));
    let dy = per_degree.clone() * (lat2 - lat1);
    let dx = per_degree * lon_scale * (lon2 - lon1);
    (dy.clone() * dy + dx.clone() * dx).sqrt()
}

/// Approximate distance on a flat plane, scaling longitude by the cosine
/// of the mean latitude
pub fn planar_distance<N: Numeric>(lat1: N, lon1: N, lat2: N, lon2: N, units: Units) -> N {
    let scale = mean_latitude(lat1.clone(), lat2.clone()).to_radians().cos();
    planar_distance_with_scale(lat1, lon1, lat2, lon2, scale, units)
}

/// Great-circle distance (haversine)
pub fn spherical_distance<N: Numeric>(lat1: N, lon1: N, lat2: N, lon2: N, units: Units) -> N {
    let phi1 = lat1.clone().to_radians();
    let phi2 = lat2.clone().to_radians();
    let half_dphi = ((lat2 - lat1).to_radians() / N::lit(2.0)).sin();
    let half_dlambda = ((lon2 - lon1).to_radians() / N::lit(2.0)).sin();

    let a = half_dphi.clone() * half_dphi
        + phi1.cos() * phi2.cos() * half_dlambda.clone() * half_dlambda;
    let c = a.clone().sqrt().atan2((N::lit(1.0) - a).sqrt());

    N::lit(2.0 * units.earth_radius()) * c
}

/// Initial compass bearing from point 1 to point 2, in degrees `[0, 360)`
///
/// Coincident points have a bearing of 0.
pub fn bearing<N: Numeric>(lat1: N, lon1: N, lat2: N, lon2: N, method: BearingMethod) -> N {
    let (y, x) = match method {
        BearingMethod::Linear => {
            let scale = mean_latitude(lat1.clone(), lat2.clone()).to_radians().cos();
            ((lon2 - lon1) * scale, lat2 - lat1)
        }
        BearingMethod::Spherical => {
            let phi1 = lat1.to_radians();
            let phi2 = lat2.to_radians();
            let dlambda = (lon2 - lon1).to_radians();
            let y = dlambda.clone().sin() * phi2.clone().cos();
            let x = phi1.clone().cos() * phi2.clone().sin()
                - phi1.sin() * phi2.cos() * dlambda.cos();
            (y, x)
        }
    };
    (y.atan2(x).to_degrees() + N::lit(360.0)).modulo(360.0)
}

/// Bearing snapped to the middle of the quadrant point 2 lies in
///
/// Needs only comparisons, so it works where trigonometry is unavailable.
/// Coincident points report 45 (north-east).
pub fn quadrant_bearing<N: Numeric>(lat1: N, lon1: N, lat2: N, lon2: N) -> N {
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    dlat.if_non_negative(
        dlon.clone().if_non_negative(N::lit(45.0), N::lit(315.0)),
        dlon.if_non_negative(N::lit(135.0), N::lit(225.0)),
    )
}

fn mean_latitude<N: Numeric>(lat1: N, lat2: N) -> N {
    (lat1 + lat2) / N::lit(2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Expr;
    use approx::assert_abs_diff_eq;
    use std::collections::HashMap;

    const NYC: (f64, f64) = (40.7128, -74.0060);
    const LONDON: (f64, f64) = (51.5074, -0.1278);

    #[test]
    fn test_latitude_degree_distance() {
        assert_abs_diff_eq!(latitude_degree_distance(Units::Km), 111.19, epsilon = 0.01);
        assert_abs_diff_eq!(latitude_degree_distance(Units::Mi), 69.09, epsilon = 0.01);
        assert_abs_diff_eq!(longitude_degree_distance(60.0, Units::Km), 55.6, epsilon = 0.01);
    }

    #[test]
    fn test_spherical_distance_zero_for_same_point() {
        let d = spherical_distance(NYC.0, NYC.1, NYC.0, NYC.1, Units::Km);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn test_spherical_distance_symmetric() {
        let there = spherical_distance(NYC.0, NYC.1, LONDON.0, LONDON.1, Units::Km);
        let back = spherical_distance(LONDON.0, LONDON.1, NYC.0, NYC.1, Units::Km);
        assert_eq!(there, back);
    }

    #[test]
    fn test_spherical_distance_known_value() {
        let km = spherical_distance(NYC.0, NYC.1, LONDON.0, LONDON.1, Units::Km);
        assert_abs_diff_eq!(km, 5570.0, epsilon = 10.0);

        let mi = spherical_distance(NYC.0, NYC.1, LONDON.0, LONDON.1, Units::Mi);
        assert_abs_diff_eq!(mi, Units::Mi.from_km(km), epsilon = 1e-6);
    }

    #[test]
    fn test_spherical_distance_across_antimeridian() {
        let d = spherical_distance(0.0, 179.5, 0.0, -179.5, Units::Km);
        assert_abs_diff_eq!(d, 111.19, epsilon = 0.01);
    }

    #[test]
    fn test_planar_close_to_spherical_at_short_range() {
        let (lat2, lon2) = (40.7484, -73.9857);
        let planar = planar_distance(NYC.0, NYC.1, lat2, lon2, Units::Km);
        let exact = spherical_distance(NYC.0, NYC.1, lat2, lon2, Units::Km);
        assert_abs_diff_eq!(planar, exact, epsilon = exact * 0.001);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        for method in [BearingMethod::Linear, BearingMethod::Spherical] {
            assert_abs_diff_eq!(bearing(0.0, 0.0, 1.0, 0.0, method), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(bearing(0.0, 0.0, 0.0, 1.0, method), 90.0, epsilon = 1e-9);
            assert_abs_diff_eq!(bearing(0.0, 0.0, -1.0, 0.0, method), 180.0, epsilon = 1e-9);
            assert_abs_diff_eq!(bearing(0.0, 0.0, 0.0, -1.0, method), 270.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_bearing_coincident_points_is_zero() {
        assert_eq!(bearing(NYC.0, NYC.1, NYC.0, NYC.1, BearingMethod::Linear), 0.0);
        assert_eq!(bearing(NYC.0, NYC.1, NYC.0, NYC.1, BearingMethod::Spherical), 0.0);
    }

    #[test]
    fn test_spherical_bearing_nyc_to_london() {
        let b = bearing(NYC.0, NYC.1, LONDON.0, LONDON.1, BearingMethod::Spherical);
        assert_abs_diff_eq!(b, 51.2, epsilon = 1.0);
        assert!((0.0..360.0).contains(&b));
    }

    #[test]
    fn test_quadrant_bearing() {
        assert_eq!(quadrant_bearing(0.0, 0.0, 1.0, 1.0), 45.0);
        assert_eq!(quadrant_bearing(0.0, 0.0, -1.0, 1.0), 135.0);
        assert_eq!(quadrant_bearing(0.0, 0.0, -1.0, -1.0), 225.0);
        assert_eq!(quadrant_bearing(0.0, 0.0, 1.0, -1.0), 315.0);
    }

    #[test]
    fn test_expression_form_agrees_with_scalar() {
        let lat = Expr::column("lat");
        let lng = Expr::column("lng");
        let row: HashMap<&str, f64> = [("lat", LONDON.0), ("lng", LONDON.1)].into_iter().collect();

        let dist = spherical_distance(Expr::lit(NYC.0), Expr::lit(NYC.1), lat.clone(), lng.clone(), Units::Km);
        let scalar = spherical_distance(NYC.0, NYC.1, LONDON.0, LONDON.1, Units::Km);
        assert_abs_diff_eq!(dist.eval(&row).unwrap(), scalar, epsilon = 1e-9);

        let b = bearing(Expr::lit(NYC.0), Expr::lit(NYC.1), lat.clone(), lng.clone(), BearingMethod::Spherical);
        let scalar = bearing(NYC.0, NYC.1, LONDON.0, LONDON.1, BearingMethod::Spherical);
        assert_abs_diff_eq!(b.eval(&row).unwrap(), scalar, epsilon = 1e-9);

        let p = planar_distance(Expr::lit(NYC.0), Expr::lit(NYC.1), lat, lng, Units::Mi);
        let scalar = planar_distance(NYC.0, NYC.1, LONDON.0, LONDON.1, Units::Mi);
        assert_abs_diff_eq!(p.eval(&row).unwrap(), scalar, epsilon = 1e-9);
    }

    #[test]
    fn test_expression_folds_center_terms() {
        let sql = spherical_distance(
            Expr::lit(0.0),
            Expr::lit(0.0),
            Expr::column("lat"),
            Expr::column("lng"),
            Units::Km,
        )
        .to_sql();
        // cos(radians(0)) folds to a literal 1
        assert!(sql.contains("(1 * COS(RADIANS(lat)))"), "{}", sql);
        assert!(sql.starts_with("(12742 * ATAN2("), "{}", sql);
    }

    #[test]
    fn test_bearing_method_from_str() {
        assert_eq!("Linear".parse::<BearingMethod>().unwrap(), BearingMethod::Linear);
        assert_eq!("spherical".parse::<BearingMethod>().unwrap(), BearingMethod::Spherical);
        assert!("curved".parse::<BearingMethod>().is_err());
    }
}
