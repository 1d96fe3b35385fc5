//! Engine-wide defaults in one place so they are easy to tweak.

/// How many quakes stay on the map after ranking a fetched batch.
pub const DEFAULT_MAX_DISPLAYED_ENTITIES: usize = 200;

/// Magnitudes are clamped into this range before interpolating a display priority.
pub const PRIORITY_MAGNITUDE_RANGE: (f64, f64) = (0.0, 10.0);

/// Display priority given to the weakest quakes.
pub const DEFAULT_LOW_DISPLAY_PRIORITY: f64 = 250.0;

/// Display priority given to the strongest quakes.
pub const DEFAULT_HIGH_DISPLAY_PRIORITY: f64 = 750.0;

/// USGS FDSN event query endpoint.
pub const USGS_QUERY_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// How far back the feed query reaches.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Longest look-back window accepted from config, about two centuries.
pub const MAX_LOOKBACK_DAYS: i64 = 73_000;

/// HTTP timeout for a single feed request.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_USER_AGENT: &str = "quakemap/0.1.0";
