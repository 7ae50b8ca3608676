//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default distance units
pub const DEFAULT_UNITS: &str = "km";

/// Default bearing method ("linear", "spherical" or "false")
pub const DEFAULT_BEARING: &str = "linear";

/// Default proximity search radius, in the configured units
pub const DEFAULT_RADIUS: f64 = 20.0;

/// Default per-lookup timeout in seconds (0 disables it)
pub const DEFAULT_TIMEOUT_SECS: u64 = 3;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "geoquery";
