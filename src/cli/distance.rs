//! Distance command handler

use crate::config::Config;
use crate::coord::{planar_distance, BearingMethod, Coordinates, Units};
use crate::error::Result;
use crate::near::NearDefaults;
use clap::Args;

/// Distance command arguments
#[derive(Args)]
pub struct DistanceArgs {
    #[arg(allow_hyphen_values = true)]
    pub lat1: f64,
    #[arg(allow_hyphen_values = true)]
    pub lng1: f64,
    #[arg(allow_hyphen_values = true)]
    pub lat2: f64,
    #[arg(allow_hyphen_values = true)]
    pub lng2: f64,

    /// Distance units: km or mi (defaults to config)
    #[arg(long, short = 'u')]
    pub units: Option<Units>,

    /// Use the flat-plane approximation instead of great-circle distance
    #[arg(long)]
    pub planar: bool,

    /// Bearing method: linear or spherical (defaults to config)
    #[arg(long)]
    pub bearing: Option<BearingMethod>,
}

/// Distance and bearing between the two points of `args`
fn measure(args: &DistanceArgs, defaults: NearDefaults) -> Result<(f64, Units, Option<(f64, BearingMethod)>)> {
    let from = Coordinates::new(args.lat1, args.lng1);
    let to = Coordinates::new(args.lat2, args.lng2);
    from.validate()?;
    to.validate()?;

    let units = args.units.unwrap_or(defaults.units);
    let distance = if args.planar {
        planar_distance(from.lat, from.lng, to.lat, to.lng, units)
    } else {
        from.distance_to(to, units)
    };
    let bearing = args
        .bearing
        .or(defaults.bearing)
        .map(|method| (from.bearing_to(to, method), method));

    Ok((distance, units, bearing))
}

/// Run the distance command
pub fn run(args: DistanceArgs) -> Result<()> {
    let config = Config::load()?;
    let defaults = NearDefaults::from_config(&config)?;

    let (distance, units, bearing) = measure(&args, defaults)?;
    println!("distance = {:.3} {}", distance, units);
    if let Some((degrees, method)) = bearing {
        println!("bearing = {:.1} ({})", degrees, method);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn args(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> DistanceArgs {
        DistanceArgs {
            lat1,
            lng1,
            lat2,
            lng2,
            units: None,
            planar: false,
            bearing: None,
        }
    }

    #[test]
    fn test_measure_due_north() {
        let (distance, units, bearing) = measure(&args(0.0, 0.0, 1.0, 0.0), NearDefaults::default()).unwrap();
        assert_eq!(units, Units::Km);
        assert_relative_eq!(distance, 111.19, epsilon = 0.01);
        let (degrees, method) = bearing.unwrap();
        assert_eq!(method, BearingMethod::Linear);
        assert_relative_eq!(degrees, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_measure_miles_without_bearing() {
        let defaults = NearDefaults {
            bearing: None,
            ..NearDefaults::default()
        };
        let mut a = args(0.0, 0.0, 1.0, 0.0);
        a.units = Some(Units::Mi);
        a.planar = true;
        let (distance, units, bearing) = measure(&a, defaults).unwrap();
        assert_eq!(units, Units::Mi);
        assert_relative_eq!(distance, 69.09, epsilon = 0.01);
        assert!(bearing.is_none());
    }

    #[test]
    fn test_measure_rejects_invalid_point() {
        assert!(measure(&args(0.0, 0.0, 91.0, 0.0), NearDefaults::default()).is_err());
    }
}
