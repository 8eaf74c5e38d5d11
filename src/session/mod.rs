//! Interactive analysis session
//!
//! Holds the site under analysis plus the persona and scan radius, and drives
//! geocoding, feature extraction and forecasting on request.
//!
//! Selecting a location (by address or by coordinates) always runs an analysis
//! and returns it. Changing persona or radius only updates the state; callers
//! ask for a fresh [`Session::analysis`] when they want one.

use crate::constants::scan::RADIUS_METERS;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::features::{Category, FeatureCounts, FeatureExtractor, FeatureSource};
use crate::forecast::{self, ForecastResult, Persona};
use crate::geo::{GeoBackend, Geocoder};
use crate::model::ForecastModels;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Mutable session configuration and selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Site under analysis; None until a location is picked
    pub location: Option<Coordinates>,
    pub persona: Persona,
    /// Scan radius in meters
    pub radius: u32,
}

/// Non-fatal notices attached to an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// No demand drivers found; revenue forced to zero
    NoDemandDrivers,
    /// The category's query failed and was counted as zero
    CategoryUnavailable { category: Category },
}

impl Advisory {
    pub fn message(&self) -> String {
        match self {
            Self::NoDemandDrivers => "No drivers found! Revenue set to 0.".to_string(),
            Self::CategoryUnavailable { category } => {
                format!("Could not query {}; counted as 0.", category)
            }
        }
    }
}

/// Full result of analyzing one site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub location: Coordinates,
    pub persona: Persona,
    pub radius: u32,
    pub counts: FeatureCounts,
    pub forecast: ForecastResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<Advisory>,
}

/// One interactive site-selection session
pub struct Session<G, F> {
    geocoder: Geocoder<G>,
    extractor: FeatureExtractor<F>,
    models: Arc<ForecastModels>,
    state: SessionState,
}

impl<G: GeoBackend, F: FeatureSource> Session<G, F> {
    /// Start a session with no location selected
    pub fn new(
        geo: G,
        features: F,
        models: Arc<ForecastModels>,
        persona: Persona,
        radius: u32,
    ) -> Result<Self> {
        validate_radius(radius)?;
        Ok(Self {
            geocoder: Geocoder::new(geo),
            extractor: FeatureExtractor::new(features),
            models,
            state: SessionState {
                location: None,
                persona,
                radius,
            },
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Geocode an address, select it, and analyze it
    ///
    /// Returns [`Error::AddressNotFound`] and leaves the state untouched when
    /// the address cannot be resolved.
    pub async fn set_address(&mut self, address: &str) -> Result<AnalysisReport> {
        match self.geocoder.resolve(address).await {
            Some(coords) => {
                info!("Address '{}' resolved to {}", address.trim(), coords);
                self.select(coords).await
            }
            None => {
                warn!("Address not found: '{}'", address.trim());
                Err(Error::AddressNotFound(address.trim().to_string()))
            }
        }
    }

    /// Select a site directly (e.g. picked on a map) and analyze it
    pub async fn set_coordinate(&mut self, coords: Coordinates) -> Result<AnalysisReport> {
        coords.validate()?;
        self.select(coords).await
    }

    pub fn set_persona(&mut self, persona: Persona) -> &SessionState {
        self.state.persona = persona;
        &self.state
    }

    pub fn set_radius(&mut self, radius: u32) -> Result<&SessionState> {
        validate_radius(radius)?;
        self.state.radius = radius;
        Ok(&self.state)
    }

    /// Analyze the selected site with the current persona and radius
    ///
    /// Always queries fresh counts; nothing is reused between calls.
    pub async fn analysis(&self) -> Result<AnalysisReport> {
        let location = self.state.location.ok_or(Error::NoLocation)?;
        let persona = self.state.persona;
        let radius = self.state.radius;

        let extraction = self.extractor.extract_detailed(location, radius).await;
        let forecast = forecast::analyze(&self.models, &extraction.counts, persona);

        let mut advisories: Vec<Advisory> = extraction
            .failed
            .iter()
            .map(|&category| Advisory::CategoryUnavailable { category })
            .collect();
        if forecast.guardrail_applied {
            advisories.push(Advisory::NoDemandDrivers);
        }

        info!(
            "Analyzed {} for {} (r={}m): {:?} -> {:.0} {}",
            location,
            persona,
            radius,
            extraction.counts,
            forecast.predicted_revenue,
            forecast.verdict
        );

        Ok(AnalysisReport {
            id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            location,
            persona,
            radius,
            counts: extraction.counts,
            forecast,
            advisories,
        })
    }

    async fn select(&mut self, coords: Coordinates) -> Result<AnalysisReport> {
        self.state.location = Some(coords);
        self.analysis().await
    }
}

/// Check a scan radius against the supported range
pub fn validate_radius(radius: u32) -> Result<()> {
    if !RADIUS_METERS.contains(&radius) {
        return Err(Error::InvalidRadius(format!(
            "Radius must be between {} and {} meters, got {}",
            RADIUS_METERS.start(),
            RADIUS_METERS.end(),
            radius
        )));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::tests::MockFeatureSource;
    use crate::forecast::Verdict;
    use crate::geo::tests::MockGeoBackend;
    use crate::model::tests::models;

    pub(crate) type TestSession = Session<MockGeoBackend, MockFeatureSource>;

    pub(crate) fn test_session(counts: FeatureCounts) -> (TestSession, MockFeatureSource) {
        let geo = MockGeoBackend::with_place("Journal Square, NJ", 40.7326, -74.0627);
        let features = MockFeatureSource::new(counts);
        let session = Session::new(
            geo,
            features.clone(),
            Arc::new(models().clone()),
            Persona::Premium,
            500,
        )
        .unwrap();
        (session, features)
    }

    #[tokio::test]
    async fn test_starts_without_location() {
        let (session, _) = test_session(FeatureCounts::new(2, 30, 5));
        assert_eq!(session.state().location, None);
        assert!(matches!(session.analysis().await, Err(Error::NoLocation)));
    }

    #[tokio::test]
    async fn test_set_address_selects_and_analyzes() {
        let (mut session, features) = test_session(FeatureCounts::new(2, 30, 5));

        let report = session.set_address("Journal Square, NJ").await.unwrap();

        assert_eq!(report.location, Coordinates::new(40.7326, -74.0627));
        assert_eq!(session.state().location, Some(report.location));
        assert_eq!(report.counts, FeatureCounts::new(2, 30, 5));
        assert_eq!(report.persona, Persona::Premium);
        assert_eq!(report.forecast.verdict, Verdict::Prime);
        assert!(report.advisories.is_empty());
        assert_eq!(features.radii().len(), 3);
    }

    #[tokio::test]
    async fn test_unresolvable_address_keeps_state() {
        let (mut session, features) = test_session(FeatureCounts::new(2, 30, 5));
        session.set_coordinate(Coordinates::new(40.7282, -74.0776)).await.unwrap();
        let before = *session.state();

        let result = session.set_address("a string with no geocodable content").await;

        assert!(matches!(result, Err(Error::AddressNotFound(_))));
        assert_eq!(*session.state(), before);
        // no extraction for the failed lookup
        assert_eq!(features.radii().len(), 3);
    }

    #[tokio::test]
    async fn test_set_coordinate_rejects_invalid() {
        let (mut session, _) = test_session(FeatureCounts::new(2, 30, 5));
        let result = session.set_coordinate(Coordinates::new(95.0, 0.0)).await;
        assert!(matches!(result, Err(Error::InvalidCoordinates(_))));
        assert_eq!(session.state().location, None);
    }

    #[tokio::test]
    async fn test_radius_change_does_not_reanalyze() {
        let (mut session, features) = test_session(FeatureCounts::new(2, 30, 5));
        session.set_coordinate(Coordinates::new(40.7282, -74.0776)).await.unwrap();

        let state = session.set_radius(1500).unwrap();
        assert_eq!(state.radius, 1500);
        assert_eq!(features.radii(), vec![500, 500, 500]);

        let report = session.analysis().await.unwrap();
        assert_eq!(report.radius, 1500);
        assert_eq!(&features.radii()[3..], &[1500, 1500, 1500]);
    }

    #[tokio::test]
    async fn test_zero_radius_rejected() {
        let (mut session, _) = test_session(FeatureCounts::new(2, 30, 5));
        assert!(matches!(session.set_radius(0), Err(Error::InvalidRadius(_))));
        assert_eq!(session.state().radius, 500);
    }

    #[tokio::test]
    async fn test_radius_outside_scan_range_rejected() {
        let (mut session, features) = test_session(FeatureCounts::new(2, 30, 5));
        for radius in [199, 2001, 50_000] {
            assert!(matches!(session.set_radius(radius), Err(Error::InvalidRadius(_))));
        }
        assert_eq!(session.state().radius, 500);

        assert_eq!(session.set_radius(200).unwrap().radius, 200);
        assert_eq!(session.set_radius(2000).unwrap().radius, 2000);
        assert!(features.radii().is_empty());
    }

    #[tokio::test]
    async fn test_persona_change_applies_on_next_analysis() {
        let (mut session, features) = test_session(FeatureCounts::new(10, 20, 1));
        let premium = session.set_coordinate(Coordinates::new(40.7282, -74.0776)).await.unwrap();

        session.set_persona(Persona::Budget);
        assert_eq!(features.radii().len(), 3);

        let budget = session.analysis().await.unwrap();
        assert_eq!(premium.persona, Persona::Premium);
        assert_eq!(budget.persona, Persona::Budget);
        assert_eq!(
            budget.forecast.predicted_revenue,
            models().predict(Persona::Budget, &FeatureCounts::new(10, 20, 1))
        );
    }

    #[tokio::test]
    async fn test_no_drivers_advisory() {
        let (mut session, _) = test_session(FeatureCounts::new(5, 0, 3));
        let report = session.set_coordinate(Coordinates::new(40.7282, -74.0776)).await.unwrap();

        assert_eq!(report.forecast.predicted_revenue, 0.0);
        assert_eq!(report.forecast.verdict, Verdict::Avoid);
        assert_eq!(report.advisories, vec![Advisory::NoDemandDrivers]);
    }

    #[tokio::test]
    async fn test_failed_category_advisory() {
        let (mut session, mut features) = test_session(FeatureCounts::new(5, 12, 3));
        features.leisure = None;
        session.extractor = FeatureExtractor::new(features);

        let report = session.set_coordinate(Coordinates::new(40.7282, -74.0776)).await.unwrap();

        assert_eq!(report.counts, FeatureCounts::new(5, 12, 0));
        assert_eq!(
            report.advisories,
            vec![Advisory::CategoryUnavailable {
                category: Category::Leisure
            }]
        );
    }

    #[test]
    fn test_new_rejects_zero_radius() {
        let result = Session::new(
            MockGeoBackend::default(),
            MockFeatureSource::new(FeatureCounts::default()),
            Arc::new(models().clone()),
            Persona::Budget,
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_advisory_serialization() {
        let json = serde_json::to_string(&Advisory::CategoryUnavailable {
            category: Category::Drivers,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"category_unavailable","category":"drivers"}"#);
    }
}
