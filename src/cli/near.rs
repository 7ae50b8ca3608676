//! Near command handler
//!
//! Prints the SQL for a proximity search around a point or a place.

use crate::config::Config;
use crate::coord::{Coordinates, Units};
use crate::error::{Error, Result};
use crate::geocoder::Geocoder;
use crate::near::{
    backend_by_name, parse_bearing, BearingChoice, Collection, NearOptions, OrderBy, Selection,
};
use crate::query::QueryText;
use clap::Args;

/// Near command arguments
#[derive(Args)]
pub struct NearArgs {
    /// Latitude of the center
    #[arg(long, allow_hyphen_values = true, requires = "lng", conflicts_with = "location")]
    pub lat: Option<f64>,

    /// Longitude of the center
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Place to geocode and search around
    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// Search radius (defaults to config)
    #[arg(long, short = 'r')]
    pub radius: Option<f64>,

    /// Distance units: km or mi
    #[arg(long, short = 'u')]
    pub units: Option<Units>,

    /// Bearing method: linear, spherical or false
    #[arg(long)]
    pub bearing: Option<String>,

    /// Database backend: sqlite, postgres or mysql
    #[arg(long, short = 'b', default_value = "postgres")]
    pub backend: String,

    /// Table to search
    #[arg(long, default_value = "locations")]
    pub table: String,

    /// Latitude column
    #[arg(long, default_value = "latitude")]
    pub lat_column: String,

    /// Longitude column
    #[arg(long, default_value = "longitude")]
    pub lng_column: String,

    /// Primary key column
    #[arg(long, default_value = "id")]
    pub primary_key: String,

    /// Primary key of a row to leave out
    #[arg(long, allow_hyphen_values = true)]
    pub exclude: Option<i64>,

    /// ORDER BY clause (defaults to "distance ASC")
    #[arg(long, conflicts_with = "no_order")]
    pub order: Option<String>,

    /// Leave out the ORDER BY clause
    #[arg(long)]
    pub no_order: bool,

    /// Columns to select (defaults to "<table>.*")
    #[arg(long, conflicts_with = "ids_only")]
    pub select: Option<String>,

    /// Select only the primary key
    #[arg(long)]
    pub ids_only: bool,
}

impl NearArgs {
    fn options(&self) -> Result<NearOptions> {
        let bearing = match &self.bearing {
            None => BearingChoice::Configured,
            Some(value) => match parse_bearing(value)? {
                Some(method) => BearingChoice::Method(method),
                None => BearingChoice::Disabled,
            },
        };
        let order = if self.no_order {
            OrderBy::Disabled
        } else {
            self.order.clone().map_or(OrderBy::Default, OrderBy::Column)
        };
        let select = if self.ids_only {
            Selection::IdOnly
        } else {
            self.select.clone().map_or(Selection::All, Selection::Columns)
        };

        Ok(NearOptions {
            units: self.units,
            bearing,
            order,
            exclude: self.exclude,
            select,
            ..NearOptions::default()
        })
    }

    fn collection(&self) -> Collection {
        Collection::new(self.table.as_str())
            .with_columns(self.lat_column.as_str(), self.lng_column.as_str())
            .with_primary_key(self.primary_key.as_str())
    }

    fn location(&self) -> Result<QueryText> {
        if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            let center = Coordinates::new(lat, lng);
            center.validate()?;
            return Ok(center.into());
        }
        self.location
            .as_deref()
            .map(QueryText::from)
            .ok_or_else(|| Error::Config("No location specified. Use --lat/--lng or --location".into()))
    }
}

/// Run the near command
pub async fn run(args: NearArgs) -> Result<()> {
    let config = Config::load()?;
    let geocoder = Geocoder::from_config(&config)?;
    let backend = backend_by_name(&args.backend)?;

    let location = args.location()?;
    let options = args.options()?;
    let collection = args.collection();

    let spec = geocoder
        .near(location, args.radius, &options, &collection, backend.as_ref())
        .await?;

    if spec.bounding_box.is_none() {
        eprintln!("Location could not be resolved; the query matches no rows");
    }
    println!("{};", spec.to_sql());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::BearingMethod;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        near: NearArgs,
    }

    fn parse(args: &[&str]) -> NearArgs {
        let mut argv = vec!["near"];
        argv.extend_from_slice(args);
        Harness::parse_from(argv).near
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--lat", "40.7", "--lng", "-74.0"]);
        assert_eq!(args.options().unwrap(), NearOptions::default());
        assert_eq!(args.collection(), Collection::new("locations"));
        assert_eq!(args.location().unwrap(), QueryText::from((40.7, -74.0)));
    }

    #[test]
    fn test_option_flags() {
        let args = parse(&[
            "--location",
            "Paris",
            "--bearing",
            "spherical",
            "--no-order",
            "--ids-only",
            "--exclude",
            "12",
            "--units",
            "mi",
        ]);
        let options = args.options().unwrap();
        assert_eq!(options.bearing, BearingChoice::Method(BearingMethod::Spherical));
        assert_eq!(options.order, OrderBy::Disabled);
        assert_eq!(options.select, Selection::IdOnly);
        assert_eq!(options.exclude, Some(12));
        assert_eq!(options.units, Some(Units::Mi));
        assert_eq!(args.location().unwrap(), QueryText::from("Paris"));
    }

    #[test]
    fn test_bearing_off() {
        let args = parse(&["--lat", "1", "--lng", "2", "--bearing", "false"]);
        assert_eq!(args.options().unwrap().bearing, BearingChoice::Disabled);
    }

    #[test]
    fn test_missing_location() {
        let args = parse(&[]);
        assert!(matches!(args.location(), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_center_rejected() {
        let args = parse(&["--lat", "95", "--lng", "0"]);
        assert!(matches!(args.location(), Err(Error::InvalidCoordinates(_))));
    }
}
