//! Database backends
//!
//! The proximity builder only needs to know two things about the database
//! that will run its SQL: whether trigonometric functions exist, and
//! whether rows can be filtered on an arbitrary computed inequality.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Capabilities of the database a proximity query is generated for
pub trait Backend: Send + Sync + Debug {
    /// Backend name (e.g., "sqlite", "postgres")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of this backend
    fn description(&self) -> &'static str;

    /// SIN, COS, ATAN2, RADIANS, DEGREES and MOD are available
    fn supports_trig_functions(&self) -> bool;

    /// `WHERE <computed distance> <= radius` is allowed
    ///
    /// Backends without it filter on the bounding box alone and over-fetch
    /// the box corners.
    fn supports_arbitrary_inequality(&self) -> bool;
}

/// SQLite: no trigonometry, bounding-box filtering only
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

/// PostgreSQL (and PostGIS-less Postgres-compatible databases)
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

/// MySQL and MariaDB
#[derive(Debug, Clone, Copy, Default)]
pub struct Mysql;

impl Backend for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn description(&self) -> &'static str {
        "SQLite (planar distance, quadrant bearing, bounding-box filter)"
    }

    fn supports_trig_functions(&self) -> bool {
        false
    }

    fn supports_arbitrary_inequality(&self) -> bool {
        false
    }
}

impl Backend for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn description(&self) -> &'static str {
        "PostgreSQL (spherical distance and bearing, exact radius filter)"
    }

    fn supports_trig_functions(&self) -> bool {
        true
    }

    fn supports_arbitrary_inequality(&self) -> bool {
        true
    }
}

impl Backend for Mysql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn description(&self) -> &'static str {
        "MySQL / MariaDB (spherical distance and bearing, exact radius filter)"
    }

    fn supports_trig_functions(&self) -> bool {
        true
    }

    fn supports_arbitrary_inequality(&self) -> bool {
        true
    }
}

/// Information about a backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendInfo {
    pub name: String,
    pub description: String,
}

/// Get a backend by name
pub fn backend_by_name(name: &str) -> Result<Box<dyn Backend>> {
    match name.trim().to_lowercase().as_str() {
        "sqlite" | "sqlite3" => Ok(Box::new(Sqlite)),
        "postgres" | "postgresql" | "postgis" => Ok(Box::new(Postgres)),
        "mysql" | "mysql2" | "mariadb" => Ok(Box::new(Mysql)),
        other => Err(Error::Config(format!(
            "Unknown database backend: {} (expected sqlite, postgres or mysql)",
            other
        ))),
    }
}

/// List all available backends with their info
pub fn available_backends() -> Vec<BackendInfo> {
    let backends: [&dyn Backend; 3] = [&Sqlite, &Postgres, &Mysql];
    backends
        .iter()
        .map(|backend| BackendInfo {
            name: backend.name().to_string(),
            description: backend.description().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        assert!(!Sqlite.supports_trig_functions());
        assert!(!Sqlite.supports_arbitrary_inequality());
        assert!(Postgres.supports_trig_functions() && Postgres.supports_arbitrary_inequality());
        assert!(Mysql.supports_trig_functions() && Mysql.supports_arbitrary_inequality());
    }

    #[test]
    fn test_backend_by_name() {
        assert_eq!(backend_by_name("SQLite3").unwrap().name(), "sqlite");
        assert_eq!(backend_by_name("postgresql").unwrap().name(), "postgres");
        assert_eq!(backend_by_name("mariadb").unwrap().name(), "mysql");
        assert!(backend_by_name("oracle").is_err());
    }

    #[test]
    fn test_available_backends() {
        let names: Vec<String> = available_backends().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["sqlite", "postgres", "mysql"]);
    }
}
