//! Proximity queries
//!
//! Builds the SQL that finds geocoded rows near a point: a bounding-box
//! filter, an exact radius check where the database allows it, distance
//! and bearing columns, and ordering. What gets generated depends on the
//! [`Backend`]'s capabilities, not on a dialect name.
//!
//! ## Flex Point
//! Adding a database backend requires:
//! 1. Implement [`Backend`] in `backend.rs`
//! 2. Add it to `backend_by_name` and `available_backends`

pub mod backend;
pub mod predicate;

pub use backend::{available_backends, backend_by_name, Backend, BackendInfo, Mysql, Postgres, Sqlite};
pub use predicate::Predicate;

use crate::config::Config;
use crate::config::defaults::DEFAULT_RADIUS;
use crate::coord::{
    bearing, bounding_box, planar_distance_with_scale, quadrant_bearing, spherical_distance,
    BearingMethod, BoundingBox, Coordinates, Expr, Numeric, Row, Units,
};
use crate::error::{Error, Result};
use std::cmp::Ordering;
use tracing::warn;

/// Parse a bearing setting; `false`, `none` and `off` disable bearings
pub fn parse_bearing(value: &str) -> Result<Option<BearingMethod>> {
    match value.trim().to_lowercase().as_str() {
        "false" | "none" | "off" | "" => Ok(None),
        other => other.parse().map(Some).map_err(Error::Config),
    }
}

/// A table of geocoded rows
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub table: String,
    pub latitude: String,
    pub longitude: String,
    pub primary_key: String,
    /// Units for this table's searches, overriding the global default
    pub units: Option<Units>,
}

impl Collection {
    /// A table with `latitude`, `longitude` and `id` columns
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            primary_key: "id".to_string(),
            units: None,
        }
    }

    pub fn with_columns(mut self, latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        self.latitude = latitude.into();
        self.longitude = longitude.into();
        self
    }

    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    /// Prefix `column` with the table name unless it already names one
    pub fn column(&self, column: &str) -> String {
        if column.contains('.') {
            column.to_string()
        } else {
            format!("{}.{}", self.table, column)
        }
    }

    fn latitude_column(&self) -> String {
        self.column(&self.latitude)
    }

    fn longitude_column(&self) -> String {
        self.column(&self.longitude)
    }
}

/// ORDER BY choice
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OrderBy {
    /// `distance ASC`, unless the distance column is not selected
    #[default]
    Default,
    Column(String),
    Disabled,
}

/// SELECT list choice
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// `table.*`
    #[default]
    All,
    /// A caller-supplied column list
    Columns(String),
    /// Only the primary key; no distance or bearing columns
    IdOnly,
    /// Only the distance and bearing columns
    GeoOnly,
}

/// Bearing choice for one search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BearingChoice {
    /// Whatever the defaults say
    #[default]
    Configured,
    Disabled,
    Method(BearingMethod),
}

/// Per-search options
#[derive(Debug, Clone, PartialEq)]
pub struct NearOptions {
    pub units: Option<Units>,
    pub bearing: BearingChoice,
    pub order: OrderBy,
    /// Primary key of a row to leave out, e.g. the row searched around
    pub exclude: Option<i64>,
    pub select: Selection,
    pub select_distance: bool,
    pub select_bearing: bool,
}

impl Default for NearOptions {
    fn default() -> Self {
        Self {
            units: None,
            bearing: BearingChoice::Configured,
            order: OrderBy::Default,
            exclude: None,
            select: Selection::All,
            select_distance: true,
            select_bearing: true,
        }
    }
}

/// Fallbacks for options a search leaves unset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearDefaults {
    pub units: Units,
    pub bearing: Option<BearingMethod>,
    pub radius: f64,
}

impl Default for NearDefaults {
    fn default() -> Self {
        Self {
            units: Units::Km,
            bearing: Some(BearingMethod::Linear),
            radius: DEFAULT_RADIUS,
        }
    }
}

impl NearDefaults {
    /// Defaults from the `[defaults]` config section
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            units: config.defaults.units.parse().map_err(Error::Config)?,
            bearing: parse_bearing(&config.defaults.bearing)?,
            radius: config.defaults.radius,
        })
    }
}

/// A generated proximity query
#[derive(Debug, Clone, PartialEq)]
pub struct ProximitySpec {
    pub table: String,
    pub select: String,
    pub predicate: Predicate,
    pub order_by: Option<String>,
    /// Absent when the center was invalid
    pub bounding_box: Option<BoundingBox>,
    pub distance: Option<Expr>,
    pub bearing: Option<Expr>,
    pub exclude: Option<i64>,
    pub units: Units,
    pub radius: Option<f64>,
}

impl ProximitySpec {
    /// A query over `collection` that matches no rows
    ///
    /// Distance and bearing are still selected, as NULL, so callers can
    /// order or filter on them.
    fn empty(collection: &Collection, units: Units) -> Self {
        Self {
            table: collection.table.clone(),
            select: select_clause(collection, &Selection::All, Some(&Expr::Null), Some(&Expr::Null)),
            predicate: Predicate::Never,
            order_by: None,
            bounding_box: None,
            distance: None,
            bearing: None,
            exclude: None,
            units,
            radius: None,
        }
    }

    /// A plain filter over `collection`
    fn filtered(collection: &Collection, predicate: Predicate, units: Units) -> Self {
        Self {
            select: select_clause(collection, &Selection::All, None, None),
            predicate,
            ..Self::empty(collection, units)
        }
    }

    pub fn select_clause(&self) -> &str {
        &self.select
    }

    pub fn where_clause(&self) -> String {
        self.predicate.to_sql()
    }

    /// The full SELECT statement
    pub fn to_sql(&self) -> String {
        let mut sql = format!(
            "SELECT {} FROM {} WHERE {}",
            self.select,
            self.table,
            self.where_clause()
        );
        if let Some(order) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        sql
    }

    /// Whether the WHERE clause accepts `row`
    pub fn matches(&self, row: &dyn Row) -> bool {
        self.predicate.matches(row)
    }

    pub fn distance_for(&self, row: &dyn Row) -> Option<f64> {
        self.distance.as_ref()?.eval(row)
    }

    pub fn bearing_for(&self, row: &dyn Row) -> Option<f64> {
        self.bearing.as_ref()?.eval(row)
    }

    /// Apply the query to in-memory rows: filter, then order
    ///
    /// Orders on `distance`, `bearing` or a single column, ascending unless
    /// the order ends in `DESC`. Rows with no value for the order key sort
    /// last.
    pub fn filter<'r, R: Row>(&self, rows: &'r [R]) -> Vec<&'r R> {
        let mut matched: Vec<&R> = rows.iter().filter(|row| self.matches(*row)).collect();

        if let Some(order) = &self.order_by {
            let mut parts = order.split_whitespace();
            let key = parts.next().unwrap_or_default().to_string();
            let descending = parts.next().is_some_and(|dir| dir.eq_ignore_ascii_case("desc"));

            let value = |row: &R| -> Option<f64> {
                match key.as_str() {
                    "distance" => self.distance_for(row),
                    "bearing" => self.bearing_for(row),
                    column => row.value(column),
                }
            };
            matched.sort_by(|a, b| match (value(*a), value(*b)) {
                (Some(x), Some(y)) => {
                    let ordering = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                    if descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                }
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            });
        }
        matched
    }
}

/// The SELECT list
fn select_clause(
    collection: &Collection,
    selection: &Selection,
    distance: Option<&Expr>,
    bearing: Option<&Expr>,
) -> String {
    let mut clause = match selection {
        Selection::IdOnly => return collection.column(&collection.primary_key),
        Selection::GeoOnly => String::new(),
        Selection::Columns(columns) => columns.clone(),
        Selection::All => collection.column("*"),
    };
    for (expr, alias) in [(distance, "distance"), (bearing, "bearing")] {
        if let Some(expr) = expr {
            if !clause.is_empty() {
                clause.push_str(", ");
            }
            clause.push_str(&format!("{} AS {}", expr.to_sql(), alias));
        }
    }
    clause
}

/// Generates proximity queries for one collection on one backend
#[derive(Debug)]
pub struct ProximityQueryBuilder<'a> {
    collection: &'a Collection,
    backend: &'a dyn Backend,
    defaults: NearDefaults,
}

impl<'a> ProximityQueryBuilder<'a> {
    pub fn new(collection: &'a Collection, backend: &'a dyn Backend) -> Self {
        Self {
            collection,
            backend,
            defaults: NearDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: NearDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Search option, else collection setting, else global default
    fn units(&self, options: &NearOptions) -> Units {
        options
            .units
            .or(self.collection.units)
            .unwrap_or(self.defaults.units)
    }

    fn bearing_method(&self, options: &NearOptions) -> Option<BearingMethod> {
        match options.bearing {
            BearingChoice::Configured => self.defaults.bearing,
            BearingChoice::Disabled => None,
            BearingChoice::Method(method) => Some(method),
        }
    }

    fn columns(&self) -> (Expr, Expr) {
        (
            Expr::column(self.collection.latitude_column()),
            Expr::column(self.collection.longitude_column()),
        )
    }

    fn distance_expr(&self, center: Coordinates, units: Units) -> Expr {
        let (lat, lng) = self.columns();
        let (center_lat, center_lng) = (Expr::lit(center.lat), Expr::lit(center.lng));
        if self.backend.supports_trig_functions() {
            spherical_distance(center_lat, center_lng, lat, lng, units)
        } else {
            // Longitude scale is fixed at the center's latitude
            let scale = Expr::lit(center.lat.to_radians().cos());
            planar_distance_with_scale(center_lat, center_lng, lat, lng, scale, units)
        }
    }

    fn bearing_expr(&self, center: Coordinates, method: BearingMethod) -> Expr {
        let (lat, lng) = self.columns();
        let (center_lat, center_lng) = (Expr::lit(center.lat), Expr::lit(center.lng));
        if self.backend.supports_trig_functions() {
            bearing(center_lat, center_lng, lat, lng, method)
        } else {
            quadrant_bearing(center_lat, center_lng, lat, lng)
        }
    }

    /// Rows within `radius` of `center`
    ///
    /// `radius` is in the search's units and falls back to the default
    /// radius. An absent or invalid center yields a query matching no rows.
    pub fn build(
        &self,
        center: Option<Coordinates>,
        radius: Option<f64>,
        options: &NearOptions,
    ) -> ProximitySpec {
        let units = self.units(options);
        let center = match center {
            Some(center) if center.is_valid() => center,
            other => {
                warn!(
                    "Proximity search on {} has no valid center ({:?}); matching no rows",
                    self.collection.table, other
                );
                return ProximitySpec::empty(self.collection, units);
            }
        };
        let radius = radius.unwrap_or(self.defaults.radius);

        let bbox = bounding_box(center, radius, units);
        let distance = self.distance_expr(center, units);
        let bearing = self
            .bearing_method(options)
            .map(|method| self.bearing_expr(center, method));

        let mut predicate = Predicate::within_bounding_box(
            &bbox,
            &self.collection.latitude_column(),
            &self.collection.longitude_column(),
        );
        if self.backend.supports_arbitrary_inequality() {
            predicate = predicate.and(Predicate::AtMost {
                value: distance.clone(),
                limit: Expr::lit(radius),
            });
        }
        if let Some(id) = options.exclude {
            predicate = predicate.and(Predicate::NotEqual {
                column: self.collection.column(&self.collection.primary_key),
                value: id,
            });
        }

        let order_by = match &options.order {
            OrderBy::Default => (options.select_distance && options.select != Selection::IdOnly)
                .then(|| "distance ASC".to_string()),
            OrderBy::Column(order) => Some(order.clone()),
            OrderBy::Disabled => None,
        };

        ProximitySpec {
            table: self.collection.table.clone(),
            select: select_clause(
                self.collection,
                &options.select,
                options.select_distance.then_some(&distance),
                bearing.as_ref().filter(|_| options.select_bearing),
            ),
            predicate,
            order_by,
            bounding_box: Some(bbox),
            distance: Some(distance),
            bearing,
            exclude: options.exclude,
            units,
            radius: Some(radius),
        }
    }

    /// Rows near the row `id` located at `point`, leaving that row out
    pub fn nearbys(
        &self,
        point: Option<Coordinates>,
        id: i64,
        radius: Option<f64>,
        options: &NearOptions,
    ) -> ProximitySpec {
        let options = NearOptions {
            exclude: Some(id),
            ..options.clone()
        };
        self.build(point, radius, &options)
    }

    /// Rows inside the box with corners `sw` and `ne`
    pub fn within_bounding_box(&self, sw: Coordinates, ne: Coordinates) -> ProximitySpec {
        let units = self.units(&NearOptions::default());
        if !sw.is_valid() || !ne.is_valid() {
            warn!(
                "Bounding box search on {} has invalid corners; matching no rows",
                self.collection.table
            );
            return ProximitySpec::empty(self.collection, units);
        }
        let bbox = BoundingBox::new(sw, ne);
        let predicate = Predicate::within_bounding_box(
            &bbox,
            &self.collection.latitude_column(),
            &self.collection.longitude_column(),
        );
        ProximitySpec {
            bounding_box: Some(bbox),
            ..ProximitySpec::filtered(self.collection, predicate, units)
        }
    }

    /// Distance from `point` to each row, as an SQL expression
    pub fn distance_from(&self, point: Coordinates, options: &NearOptions) -> Option<Expr> {
        point
            .is_valid()
            .then(|| self.distance_expr(point, self.units(options)))
    }

    /// Rows with both coordinates set
    pub fn geocoded(&self) -> ProximitySpec {
        let predicate = Predicate::NotNull(self.collection.latitude_column())
            .and(Predicate::NotNull(self.collection.longitude_column()));
        ProximitySpec::filtered(self.collection, predicate, self.defaults.units)
    }

    /// Rows with neither coordinate set
    pub fn not_geocoded(&self) -> ProximitySpec {
        let predicate = Predicate::IsNull(self.collection.latitude_column())
            .and(Predicate::IsNull(self.collection.longitude_column()));
        ProximitySpec::filtered(self.collection, predicate, self.defaults.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::collections::HashMap;

    fn places() -> Collection {
        Collection::new("places")
    }

    fn row(id: f64, lat: f64, lng: f64) -> HashMap<&'static str, f64> {
        [("places.id", id), ("places.latitude", lat), ("places.longitude", lng)]
            .into_iter()
            .collect()
    }

    fn dataset() -> Vec<HashMap<&'static str, f64>> {
        vec![
            row(1.0, 40.7484, -73.9857), // Empire State Building
            row(2.0, 40.7061, -73.9969), // Brooklyn Bridge
            row(3.0, 40.6892, -74.0445), // Statue of Liberty
            row(4.0, 51.5074, -0.1278),  // London
            row(5.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_invalid_center_matches_nothing() {
        let collection = places();
        for backend in [&Sqlite as &dyn Backend, &Postgres, &Mysql] {
            let builder = ProximityQueryBuilder::new(&collection, backend);
            for center in [None, Some(Coordinates::new(f64::NAN, 0.0)), Some(Coordinates::new(91.0, 0.0))] {
                let spec = builder.build(center, Some(10.0), &NearOptions::default());
                assert!(dataset().iter().all(|r| !spec.matches(r)));
                assert_eq!(spec.where_clause(), "1 = 0");
                assert_eq!(
                    spec.select_clause(),
                    "places.*, NULL AS distance, NULL AS bearing"
                );
                assert!(spec.order_by.is_none());
                assert!(spec.bounding_box.is_none());
            }
        }
    }

    #[test]
    fn test_postgres_filters_by_exact_radius() {
        let collection = places();
        let builder = ProximityQueryBuilder::new(&collection, &Postgres);
        let center = Coordinates::new(40.7484, -73.9857);
        let spec = builder.build(Some(center), Some(5.0), &NearOptions::default());

        let rows = dataset();
        let ids: Vec<f64> = spec
            .filter(&rows)
            .into_iter()
            .map(|r| r["places.id"])
            .collect();
        assert_eq!(ids, vec![1.0, 2.0]);

        let sql = spec.to_sql();
        assert!(sql.starts_with("SELECT places.*, "));
        assert!(sql.contains("AS distance"));
        assert!(sql.contains("AS bearing"));
        assert!(sql.contains("ATAN2("));
        assert!(sql.contains(" <= 5"));
        assert!(sql.ends_with(" ORDER BY distance ASC"));
    }

    #[test]
    fn test_sqlite_over_fetches_box_corners() {
        let collection = places();
        let center = Coordinates::new(0.0, 0.0);
        // Inside the 111.19 km box but about 157 km from the center
        let corner = row(9.0, 0.99, 0.99);

        let sqlite = ProximityQueryBuilder::new(&collection, &Sqlite)
            .build(Some(center), Some(111.19), &NearOptions::default());
        let postgres = ProximityQueryBuilder::new(&collection, &Postgres)
            .build(Some(center), Some(111.19), &NearOptions::default());

        assert!(sqlite.matches(&corner));
        assert!(!postgres.matches(&corner));

        // The distance column is still selected for ordering
        assert!(sqlite.select_clause().contains("AS distance"));
        assert!(!sqlite.select_clause().contains("ATAN2"));
        assert!(!sqlite.where_clause().contains("<="));
        assert!(sqlite.select_clause().contains("CASE WHEN"));
        assert_eq!(sqlite.order_by.as_deref(), Some("distance ASC"));
    }

    #[test]
    fn test_planar_distance_close_to_spherical_nearby() {
        let collection = places();
        let center = Coordinates::new(40.7484, -73.9857);
        let options = NearOptions::default();
        let planar = ProximityQueryBuilder::new(&collection, &Sqlite)
            .build(Some(center), None, &options);
        let spherical = ProximityQueryBuilder::new(&collection, &Postgres)
            .build(Some(center), None, &options);

        let brooklyn = row(2.0, 40.7061, -73.9969);
        let a = planar.distance_for(&brooklyn).unwrap();
        let b = spherical.distance_for(&brooklyn).unwrap();
        assert_abs_diff_eq!(a, b, epsilon = 0.05);
        assert_abs_diff_eq!(b, 4.8, epsilon = 0.2);
    }

    #[test]
    fn test_exclude_and_nearbys() {
        let collection = places();
        let builder = ProximityQueryBuilder::new(&collection, &Postgres);
        let center = Coordinates::new(40.7484, -73.9857);

        let spec = builder.nearbys(Some(center), 1, Some(5.0), &NearOptions::default());
        assert!(spec.where_clause().ends_with("AND places.id != 1"));
        assert_eq!(spec.exclude, Some(1));

        let rows = dataset();
        let ids: Vec<f64> = spec.filter(&rows).into_iter().map(|r| r["places.id"]).collect();
        assert_eq!(ids, vec![2.0]);
    }

    #[test]
    fn test_units_resolution() {
        let center = Coordinates::new(0.0, 0.0);
        let km = places();
        let mi = places().with_units(Units::Mi);

        let spec = ProximityQueryBuilder::new(&km, &Postgres).build(Some(center), Some(1.0), &NearOptions::default());
        assert_eq!(spec.units, Units::Km);

        let spec = ProximityQueryBuilder::new(&mi, &Postgres).build(Some(center), Some(1.0), &NearOptions::default());
        assert_eq!(spec.units, Units::Mi);
        let bbox = spec.bounding_box.unwrap();
        assert!(bbox.ne_lat > 0.0144 && bbox.ne_lat < 0.0146);

        let options = NearOptions {
            units: Some(Units::Km),
            ..NearOptions::default()
        };
        let spec = ProximityQueryBuilder::new(&mi, &Postgres).build(Some(center), Some(1.0), &options);
        assert_eq!(spec.units, Units::Km);
    }

    #[test]
    fn test_default_radius() {
        let collection = places();
        let spec = ProximityQueryBuilder::new(&collection, &Postgres).build(
            Some(Coordinates::new(10.0, 10.0)),
            None,
            &NearOptions::default(),
        );
        assert_eq!(spec.radius, Some(20.0));
    }

    #[test]
    fn test_bearing_choices() {
        let collection = places();
        let center = Some(Coordinates::new(40.0, -74.0));
        let north = row(1.0, 40.1, -74.0);

        let builder = ProximityQueryBuilder::new(&collection, &Postgres);
        let spec = builder.build(center, None, &NearOptions::default());
        assert_abs_diff_eq!(spec.bearing_for(&north).unwrap(), 0.0, epsilon = 1e-9);

        let options = NearOptions {
            bearing: BearingChoice::Disabled,
            ..NearOptions::default()
        };
        let spec = builder.build(center, None, &options);
        assert!(spec.bearing.is_none());
        assert!(!spec.select_clause().contains("AS bearing"));

        let defaults = NearDefaults {
            bearing: None,
            ..NearDefaults::default()
        };
        let spec = ProximityQueryBuilder::new(&collection, &Postgres)
            .with_defaults(defaults)
            .build(center, None, &NearOptions::default());
        assert!(spec.bearing.is_none());

        let options = NearOptions {
            bearing: BearingChoice::Method(BearingMethod::Spherical),
            ..NearOptions::default()
        };
        let east = row(2.0, 40.0, -73.9);
        let spec = builder.build(center, None, &options);
        assert_abs_diff_eq!(spec.bearing_for(&east).unwrap(), 90.0, epsilon = 0.1);
    }

    #[test]
    fn test_quadrant_bearing_on_sqlite() {
        let collection = places();
        let spec = ProximityQueryBuilder::new(&collection, &Sqlite).build(
            Some(Coordinates::new(40.0, -74.0)),
            None,
            &NearOptions::default(),
        );
        assert_eq!(spec.bearing_for(&row(1.0, 40.05, -73.95)), Some(45.0));
        assert_eq!(spec.bearing_for(&row(1.0, 39.95, -73.95)), Some(135.0));
        assert_eq!(spec.bearing_for(&row(1.0, 39.95, -74.05)), Some(225.0));
        assert_eq!(spec.bearing_for(&row(1.0, 40.05, -74.05)), Some(315.0));
    }

    #[test]
    fn test_selection_and_order_options() {
        let collection = places();
        let builder = ProximityQueryBuilder::new(&collection, &Postgres);
        let center = Some(Coordinates::new(40.0, -74.0));

        let spec = builder.build(
            center,
            None,
            &NearOptions {
                select: Selection::IdOnly,
                ..NearOptions::default()
            },
        );
        assert_eq!(spec.select_clause(), "places.id");
        assert!(spec.order_by.is_none());
        assert!(!spec.to_sql().contains("ORDER BY"));

        let spec = builder.build(
            center,
            None,
            &NearOptions {
                select: Selection::GeoOnly,
                bearing: BearingChoice::Disabled,
                ..NearOptions::default()
            },
        );
        assert!(spec.select_clause().starts_with("(12742 * ATAN2("));
        assert!(spec.select_clause().ends_with(" AS distance"));

        let spec = builder.build(
            center,
            None,
            &NearOptions {
                select: Selection::Columns("places.id, places.name".into()),
                select_distance: false,
                select_bearing: false,
                ..NearOptions::default()
            },
        );
        assert_eq!(spec.select_clause(), "places.id, places.name");
        assert!(spec.order_by.is_none());
        assert!(!spec.to_sql().contains("ORDER BY"));

        let spec = builder.build(
            center,
            None,
            &NearOptions {
                order: OrderBy::Column("places.name DESC".into()),
                ..NearOptions::default()
            },
        );
        assert_eq!(spec.order_by.as_deref(), Some("places.name DESC"));

        let spec = builder.build(
            center,
            None,
            &NearOptions {
                order: OrderBy::Disabled,
                ..NearOptions::default()
            },
        );
        assert!(spec.order_by.is_none());
    }

    #[test]
    fn test_filter_orders_by_distance() {
        let collection = places();
        let spec = ProximityQueryBuilder::new(&collection, &Postgres).build(
            Some(Coordinates::new(40.69, -74.04)),
            Some(10.0),
            &NearOptions::default(),
        );
        let rows = dataset();
        let ids: Vec<f64> = spec.filter(&rows).into_iter().map(|r| r["places.id"]).collect();
        assert_eq!(ids, vec![3.0, 2.0, 1.0]);

        let spec = ProximitySpec {
            order_by: Some("distance DESC".into()),
            ..spec
        };
        let ids: Vec<f64> = spec.filter(&rows).into_iter().map(|r| r["places.id"]).collect();
        assert_eq!(ids, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_within_bounding_box_scope() {
        let collection = places();
        let builder = ProximityQueryBuilder::new(&collection, &Sqlite);
        let spec = builder.within_bounding_box(Coordinates::new(40.0, -75.0), Coordinates::new(41.0, -73.0));
        assert_eq!(
            spec.to_sql(),
            "SELECT places.* FROM places WHERE places.latitude BETWEEN 40 AND 41 \
             AND places.longitude BETWEEN (-75) AND (-73)"
        );
        let rows = dataset();
        assert_eq!(spec.filter(&rows).len(), 3);

        let spec = builder.within_bounding_box(Coordinates::new(f64::NAN, 0.0), Coordinates::new(1.0, 1.0));
        assert_eq!(spec.where_clause(), "1 = 0");
    }

    #[test]
    fn test_geocoded_scopes() {
        let collection = places();
        let builder = ProximityQueryBuilder::new(&collection, &Mysql);
        let located = row(1.0, 1.0, 1.0);
        let missing: HashMap<&str, f64> = [("places.id", 2.0)].into_iter().collect();

        let geocoded = builder.geocoded();
        assert_eq!(
            geocoded.where_clause(),
            "places.latitude IS NOT NULL AND places.longitude IS NOT NULL"
        );
        assert!(geocoded.matches(&located));
        assert!(!geocoded.matches(&missing));

        let not_geocoded = builder.not_geocoded();
        assert!(!not_geocoded.matches(&located));
        assert!(not_geocoded.matches(&missing));
    }

    #[test]
    fn test_distance_from() {
        let collection = places().with_columns("lat", "other.lng");
        let builder = ProximityQueryBuilder::new(&collection, &Postgres);
        let expr = builder
            .distance_from(Coordinates::new(0.0, 0.0), &NearOptions::default())
            .unwrap();
        let sql = expr.to_sql();
        assert!(sql.contains("places.lat"));
        assert!(sql.contains("other.lng"));

        assert!(builder
            .distance_from(Coordinates::new(100.0, 0.0), &NearOptions::default())
            .is_none());
    }

    #[test]
    fn test_parse_bearing() {
        assert_eq!(parse_bearing("linear").unwrap(), Some(BearingMethod::Linear));
        assert_eq!(parse_bearing("Spherical").unwrap(), Some(BearingMethod::Spherical));
        assert_eq!(parse_bearing("false").unwrap(), None);
        assert!(parse_bearing("curved").is_err());
    }

    #[test]
    fn test_defaults_from_config() {
        let mut config = Config::default();
        config.set("defaults.units", "mi").unwrap();
        config.set("defaults.bearing", "false").unwrap();
        config.set("defaults.radius", "5").unwrap();
        let defaults = NearDefaults::from_config(&config).unwrap();
        assert_eq!(defaults.units, Units::Mi);
        assert_eq!(defaults.bearing, None);
        assert_eq!(defaults.radius, 5.0);
    }
}
