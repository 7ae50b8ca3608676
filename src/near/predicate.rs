//! Row filters
//!
//! A [`Predicate`] renders to a WHERE clause and can also be checked
//! against an in-memory row. A missing column behaves like SQL NULL: any
//! comparison involving it is false.

use crate::coord::expr::literal_sql;
use crate::coord::{BoundingBox, Expr, Row};
use std::fmt;

/// A boolean row filter
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches no row
    Never,
    IsNull(String),
    NotNull(String),
    Between {
        column: String,
        low: f64,
        high: f64,
    },
    /// `value <= limit`
    AtMost {
        value: Expr,
        limit: Expr,
    },
    NotEqual {
        column: String,
        value: i64,
    },
    /// Matches every row when empty
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn between(column: impl Into<String>, low: f64, high: f64) -> Self {
        Self::Between {
            column: column.into(),
            low,
            high,
        }
    }

    /// Conjunction, flattening nested `And`s
    pub fn and(self, other: Predicate) -> Self {
        let mut parts = match self {
            Self::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Self::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Self::And(parts)
    }

    /// Latitude and longitude inside `bbox`
    ///
    /// A box crossing the antimeridian becomes two longitude ranges.
    pub fn within_bounding_box(bbox: &BoundingBox, latitude: &str, longitude: &str) -> Self {
        let lat = Self::between(latitude, bbox.sw_lat, bbox.ne_lat);
        let lng = if bbox.crosses_antimeridian() {
            Self::Or(vec![
                Self::between(longitude, bbox.sw_lng, 180.0),
                Self::between(longitude, -180.0, bbox.ne_lng),
            ])
        } else {
            Self::between(longitude, bbox.sw_lng, bbox.ne_lng)
        };
        Self::And(vec![lat, lng])
    }

    pub fn matches(&self, row: &dyn Row) -> bool {
        match self {
            Self::Never => false,
            Self::IsNull(column) => row.value(column).is_none(),
            Self::NotNull(column) => row.value(column).is_some(),
            Self::Between { column, low, high } => row
                .value(column)
                .map_or(false, |v| v >= *low && v <= *high),
            Self::AtMost { value, limit } => match (value.eval(row), limit.eval(row)) {
                (Some(v), Some(l)) => v <= l,
                _ => false,
            },
            Self::NotEqual { column, value } => {
                row.value(column).map_or(false, |v| v != *value as f64)
            }
            Self::And(parts) => parts.iter().all(|p| p.matches(row)),
            Self::Or(parts) => parts.iter().any(|p| p.matches(row)),
        }
    }

    /// Render as the body of a WHERE clause
    pub fn to_sql(&self) -> String {
        match self {
            Self::Never => "1 = 0".to_string(),
            Self::IsNull(column) => format!("{} IS NULL", column),
            Self::NotNull(column) => format!("{} IS NOT NULL", column),
            Self::Between { column, low, high } => {
                format!("{} BETWEEN {} AND {}", column, literal_sql(*low), literal_sql(*high))
            }
            Self::AtMost { value, limit } => format!("{} <= {}", value.to_sql(), limit.to_sql()),
            Self::NotEqual { column, value } => format!("{} != {}", column, value),
            Self::And(parts) if parts.is_empty() => "1 = 1".to_string(),
            Self::And(parts) => parts
                .iter()
                .map(Self::operand_sql)
                .collect::<Vec<_>>()
                .join(" AND "),
            Self::Or(parts) => format!(
                "({})",
                parts
                    .iter()
                    .map(Self::operand_sql)
                    .collect::<Vec<_>>()
                    .join(" OR ")
            ),
        }
    }

    /// Parenthesize conjunctions nested inside another connective
    fn operand_sql(&self) -> String {
        match self {
            Self::And(parts) if parts.len() > 1 => format!("({})", self.to_sql()),
            _ => self.to_sql(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{Coordinates, Numeric};
    use std::collections::HashMap;

    fn row(lat: f64, lng: f64) -> HashMap<&'static str, f64> {
        [("lat", lat), ("lng", lng), ("id", 7.0)].into_iter().collect()
    }

    #[test]
    fn test_never_matches_nothing() {
        assert!(!Predicate::Never.matches(&row(0.0, 0.0)));
        assert_eq!(Predicate::Never.to_sql(), "1 = 0");
    }

    #[test]
    fn test_bounding_box_sql() {
        let bbox = BoundingBox::new(Coordinates::new(-1.0, -2.0), Coordinates::new(1.0, 2.0));
        let p = Predicate::within_bounding_box(&bbox, "lat", "lng");
        assert_eq!(
            p.to_sql(),
            "lat BETWEEN (-1) AND 1 AND lng BETWEEN (-2) AND 2"
        );
        assert!(p.matches(&row(0.5, 1.5)));
        assert!(!p.matches(&row(0.5, 2.5)));
    }

    #[test]
    fn test_antimeridian_box() {
        let bbox = BoundingBox::new(Coordinates::new(-1.0, 179.0), Coordinates::new(1.0, -179.0));
        let p = Predicate::within_bounding_box(&bbox, "lat", "lng");
        assert_eq!(
            p.to_sql(),
            "lat BETWEEN (-1) AND 1 AND (lng BETWEEN 179 AND 180 OR lng BETWEEN (-180) AND (-179))"
        );
        assert!(p.matches(&row(0.0, 179.5)));
        assert!(p.matches(&row(0.0, -179.5)));
        assert!(!p.matches(&row(0.0, 0.0)));
    }

    #[test]
    fn test_null_columns() {
        let empty: HashMap<&str, f64> = HashMap::new();
        assert!(Predicate::IsNull("lat".into()).matches(&empty));
        assert!(!Predicate::NotNull("lat".into()).matches(&empty));
        assert!(!Predicate::between("lat", -90.0, 90.0).matches(&empty));
        assert_eq!(Predicate::NotNull("t.lat".into()).to_sql(), "t.lat IS NOT NULL");
    }

    #[test]
    fn test_and_flattens_and_excludes() {
        let p = Predicate::between("lat", 0.0, 1.0)
            .and(Predicate::between("lng", 0.0, 1.0))
            .and(Predicate::NotEqual {
                column: "id".into(),
                value: 7,
            });
        match &p {
            Predicate::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
        assert!(p.to_sql().ends_with("AND id != 7"));
        assert!(!p.matches(&row(0.5, 0.5)));
    }

    #[test]
    fn test_at_most() {
        let p = Predicate::AtMost {
            value: Expr::column("lat") * Expr::lit(2.0),
            limit: Expr::lit(3.0),
        };
        assert_eq!(p.to_sql(), "(lat * 2) <= 3");
        assert!(p.matches(&row(1.5, 0.0)));
        assert!(!p.matches(&row(1.6, 0.0)));
    }

    #[test]
    fn test_empty_conjunction() {
        assert_eq!(Predicate::And(Vec::new()).to_sql(), "1 = 1");
        assert!(Predicate::And(Vec::new()).matches(&row(0.0, 0.0)));
    }
}
