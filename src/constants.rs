//! Centralized constants for the franchise-scout crate
//!
//! Values shared by more than one module live here.

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Overpass API interpreter endpoint
    pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

    /// User-Agent sent to OSM services (required by their usage policy)
    pub const USER_AGENT: &str = concat!("franchise-scout/", env!("CARGO_PKG_VERSION"));

    /// Server-side timeout requested in every Overpass query, in seconds
    pub const OVERPASS_QUERY_TIMEOUT_SECS: u32 = 180;

    /// Category queries allowed in flight at once (overpass-api.de grants two
    /// query slots per client)
    pub const OVERPASS_MAX_CONCURRENT: usize = 2;
}

/// Scan area limits
pub mod scan {
    use std::ops::RangeInclusive;

    /// Accepted scan radius, in meters. Larger circles routinely run past the
    /// Overpass query timeout, which would read as zero features.
    pub const RADIUS_METERS: RangeInclusive<u32> = 200..=2000;
}

/// Synthetic training set parameters
pub mod training {
    /// Seed for the synthetic data generator and the forest
    pub const SEED: u64 = 42;

    /// Number of synthetic rows
    pub const SAMPLES: usize = 200;

    /// Trees per forest
    pub const TREES: usize = 100;
}
