//! Geocoding module
//!
//! Resolves free-text addresses to coordinates.

pub mod nominatim;

use crate::coord::Coordinates;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Geocode a location string to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    fn geocode(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<Option<GeoLocation>>> + Send;
}

/// Address resolver over a geocoding backend
///
/// Makes exactly one backend call per lookup and keeps nothing between calls.
/// Every failure mode collapses into "not found".
#[derive(Debug, Clone)]
pub struct Geocoder<G> {
    backend: G,
}

impl<G: GeoBackend> Geocoder<G> {
    pub fn new(backend: G) -> Self {
        Self { backend }
    }

    /// Resolve an address to validated coordinates
    pub async fn resolve(&self, address: &str) -> Option<Coordinates> {
        let address = address.trim();
        if address.is_empty() {
            return None;
        }

        match self.backend.geocode(address).await {
            Ok(Some(location)) => match Coordinates::try_new(location.lat, location.lng) {
                Ok(coords) => {
                    debug!("Geocoded '{}' to {} ({})", address, coords, location.display_name);
                    Some(coords)
                }
                Err(e) => {
                    warn!("Geocoder returned unusable coordinates for '{}': {}", address, e);
                    None
                }
            },
            Ok(None) => {
                debug!("No geocoding match for '{}'", address);
                None
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", address, e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Canned geocoder for tests
    #[derive(Clone, Default)]
    pub struct MockGeoBackend {
        pub places: Vec<(String, f64, f64)>,
        pub fail: bool,
        pub calls: Arc<AtomicUsize>,
    }

    impl MockGeoBackend {
        pub fn with_place(name: &str, lat: f64, lng: f64) -> Self {
            Self {
                places: vec![(name.to_string(), lat, lng)],
                ..Default::default()
            }
        }
    }

    impl GeoBackend for MockGeoBackend {
        async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Geo("service unavailable".to_string()));
            }
            Ok(self
                .places
                .iter()
                .find(|(name, _, _)| name == query)
                .map(|(name, lat, lng)| GeoLocation {
                    lat: *lat,
                    lng: *lng,
                    display_name: name.clone(),
                }))
        }
    }

    #[test]
    fn test_geo_location_serialization() {
        let loc = GeoLocation {
            lat: 40.7282,
            lng: -74.0776,
            display_name: "Jersey City".to_string(),
        };

        let json = serde_json::to_string(&loc).unwrap();
        let parsed: GeoLocation = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.lat, 40.7282);
        assert_eq!(parsed.display_name, "Jersey City");
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let geocoder =
            Geocoder::new(MockGeoBackend::with_place("Journal Square, NJ", 40.7326, -74.0627));
        let coords = geocoder.resolve("Journal Square, NJ").await.unwrap();
        assert_eq!(coords, Coordinates::new(40.7326, -74.0627));
    }

    #[tokio::test]
    async fn test_resolve_no_match() {
        let geocoder =
            Geocoder::new(MockGeoBackend::with_place("Journal Square, NJ", 40.7326, -74.0627));
        assert!(geocoder.resolve("qwzx vvv 000").await.is_none());
    }

    #[tokio::test]
    async fn test_resolve_service_error_is_not_found() {
        let backend = MockGeoBackend {
            fail: true,
            ..Default::default()
        };
        let calls = backend.calls.clone();
        let geocoder = Geocoder::new(backend);

        assert!(geocoder.resolve("Hoboken").await.is_none());
        // single attempt, no retry
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_blank_skips_backend() {
        let backend = MockGeoBackend::default();
        let calls = backend.calls.clone();
        let geocoder = Geocoder::new(backend);

        assert!(geocoder.resolve("   ").await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_rejects_invalid_coordinates() {
        let geocoder = Geocoder::new(MockGeoBackend::with_place("nowhere", 123.0, 0.0));
        assert!(geocoder.resolve("nowhere").await.is_none());
    }
}
