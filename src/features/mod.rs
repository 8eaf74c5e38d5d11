//! Nearby feature extraction
//!
//! Counts points-of-interest around a site in three disjoint categories:
//! - Competitors: food and beverage venues
//! - Drivers: institutions and traffic generators
//! - Leisure: parks and retail amenities
//!
//! Each category is queried independently, at most two at a time. A failed
//! query counts as zero for that category only.

pub mod overpass;

use crate::constants::api::OVERPASS_MAX_CONCURRENT;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Feature category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Food and beverage venues
    Competitors,
    /// Schools, offices, hospitals, transit
    Drivers,
    /// Parks, malls, clothing retail
    Leisure,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Competitors, Category::Drivers, Category::Leisure];

    /// OSM tag filters matched by this category
    pub fn tags(&self) -> &'static [TagFilter] {
        match self {
            Self::Competitors => COMPETITOR_TAGS,
            Self::Drivers => DRIVER_TAGS,
            Self::Leisure => LEISURE_TAGS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Competitors => write!(f, "competitors"),
            Self::Drivers => write!(f, "drivers"),
            Self::Leisure => write!(f, "leisure"),
        }
    }
}

/// Accepted values for a tag key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagValues {
    /// Key present with any value
    Any,
    /// Key present with one of these values
    OneOf(&'static [&'static str]),
}

/// A single OSM tag filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagFilter {
    pub key: &'static str,
    pub values: TagValues,
}

const fn one_of(key: &'static str, values: &'static [&'static str]) -> TagFilter {
    TagFilter {
        key,
        values: TagValues::OneOf(values),
    }
}

const COMPETITOR_TAGS: &[TagFilter] = &[one_of(
    "amenity",
    &["cafe", "fast_food", "restaurant", "coffee_shop", "bar", "food_court"],
)];

const DRIVER_TAGS: &[TagFilter] = &[
    one_of(
        "amenity",
        &["school", "university", "college", "library", "hospital", "bus_station"],
    ),
    TagFilter {
        key: "office",
        values: TagValues::Any,
    },
    one_of("building", &["university", "school", "office"]),
    one_of("landuse", &["education", "commercial"]),
];

const LEISURE_TAGS: &[TagFilter] = &[
    one_of("leisure", &["park", "garden", "playground"]),
    one_of("shop", &["mall", "department_store", "clothes"]),
];

/// Raw feature counts around a site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCounts {
    pub competitors: u32,
    pub drivers: u32,
    pub leisure: u32,
}

impl FeatureCounts {
    pub fn new(competitors: u32, drivers: u32, leisure: u32) -> Self {
        Self {
            competitors,
            drivers,
            leisure,
        }
    }

    /// Model input vector, ordered (competitors, drivers, leisure)
    pub fn as_features(&self) -> [f64; 3] {
        [
            self.competitors as f64,
            self.drivers as f64,
            self.leisure as f64,
        ]
    }

    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Competitors => self.competitors,
            Category::Drivers => self.drivers,
            Category::Leisure => self.leisure,
        }
    }
}

/// Trait for geospatial feature sources
pub trait FeatureSource: Send + Sync {
    /// Count features of one category within `radius` meters of `center`
    fn count(
        &self,
        center: Coordinates,
        radius: u32,
        category: Category,
    ) -> impl std::future::Future<Output = Result<u32>> + Send;
}

/// Extraction result with the categories that could not be queried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub counts: FeatureCounts,
    pub failed: Vec<Category>,
}

/// Runs the three category queries against a feature source
#[derive(Debug, Clone)]
pub struct FeatureExtractor<F> {
    source: F,
    slots: Arc<Semaphore>,
}

impl<F: FeatureSource> FeatureExtractor<F> {
    pub fn new(source: F) -> Self {
        Self::with_max_concurrent(source, OVERPASS_MAX_CONCURRENT)
    }

    /// Extractor that keeps at most `limit` category queries in flight
    pub fn with_max_concurrent(source: F, limit: usize) -> Self {
        Self {
            source,
            slots: Arc::new(Semaphore::new(limit.max(1))),
        }
    }

    async fn count(&self, center: Coordinates, radius: u32, category: Category) -> Result<u32> {
        let _slot = self
            .slots
            .acquire()
            .await
            .map_err(|e| Error::FeatureQuery(format!("{} query slot: {}", category, e)))?;
        self.source.count(center, radius, category).await
    }

    /// Count features around `center`; never fails
    pub async fn extract(&self, center: Coordinates, radius: u32) -> FeatureCounts {
        self.extract_detailed(center, radius).await.counts
    }

    /// Count features around `center`, reporting which categories failed
    pub async fn extract_detailed(&self, center: Coordinates, radius: u32) -> Extraction {
        let (competitors, drivers, leisure) = tokio::join!(
            self.count(center, radius, Category::Competitors),
            self.count(center, radius, Category::Drivers),
            self.count(center, radius, Category::Leisure),
        );

        let mut failed = Vec::new();
        let mut settle = |category: Category, result: Result<u32>| match result {
            Ok(n) => n,
            Err(e) => {
                warn!("{} query failed, counting as 0: {}", category, e);
                failed.push(category);
                0
            }
        };

        let counts = FeatureCounts {
            competitors: settle(Category::Competitors, competitors),
            drivers: settle(Category::Drivers, drivers),
            leisure: settle(Category::Leisure, leisure),
        };

        debug!(
            "Features around {} (r={}m): {:?}, failed: {:?}",
            center, radius, counts, failed
        );

        Extraction { counts, failed }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Feature source with fixed per-category answers that records every call
    #[derive(Clone)]
    pub struct MockFeatureSource {
        pub competitors: Option<u32>,
        pub drivers: Option<u32>,
        pub leisure: Option<u32>,
        pub calls: Arc<Mutex<Vec<(Category, u32)>>>,
    }

    impl MockFeatureSource {
        pub fn new(counts: FeatureCounts) -> Self {
            Self {
                competitors: Some(counts.competitors),
                drivers: Some(counts.drivers),
                leisure: Some(counts.leisure),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn radii(&self) -> Vec<u32> {
            self.calls.lock().unwrap().iter().map(|(_, r)| *r).collect()
        }
    }

    impl FeatureSource for MockFeatureSource {
        async fn count(
            &self,
            _center: Coordinates,
            radius: u32,
            category: Category,
        ) -> Result<u32> {
            self.calls.lock().unwrap().push((category, radius));
            let answer = match category {
                Category::Competitors => self.competitors,
                Category::Drivers => self.drivers,
                Category::Leisure => self.leisure,
            };
            answer.ok_or_else(|| Error::FeatureQuery(format!("{} unavailable", category)))
        }
    }

    fn center() -> Coordinates {
        Coordinates::new(40.7282, -74.0776)
    }

    #[tokio::test]
    async fn test_extract_all_categories() {
        let source = MockFeatureSource::new(FeatureCounts::new(4, 12, 3));
        let extractor = FeatureExtractor::new(source.clone());

        let counts = extractor.extract(center(), 500).await;

        assert_eq!(counts, FeatureCounts::new(4, 12, 3));
        assert_eq!(source.radii(), vec![500, 500, 500]);
    }

    #[tokio::test]
    async fn test_single_failure_is_isolated() {
        for failing in Category::ALL {
            let mut source = MockFeatureSource::new(FeatureCounts::new(7, 9, 2));
            match failing {
                Category::Competitors => source.competitors = None,
                Category::Drivers => source.drivers = None,
                Category::Leisure => source.leisure = None,
            }
            let extractor = FeatureExtractor::new(source);

            let extraction = extractor.extract_detailed(center(), 800).await;

            assert_eq!(extraction.failed, vec![failing]);
            for category in Category::ALL {
                let expected = if category == failing {
                    0
                } else {
                    FeatureCounts::new(7, 9, 2).get(category)
                };
                assert_eq!(extraction.counts.get(category), expected);
            }
        }
    }

    #[tokio::test]
    async fn test_all_failures_yield_zero() {
        let source = MockFeatureSource {
            competitors: None,
            drivers: None,
            leisure: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        };
        let extraction = FeatureExtractor::new(source).extract_detailed(center(), 200).await;

        assert_eq!(extraction.counts, FeatureCounts::default());
        assert_eq!(extraction.failed.len(), 3);
    }

    /// Source that holds each query open briefly and tracks peak parallelism
    #[derive(Default)]
    struct SlowSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FeatureSource for SlowSource {
        async fn count(
            &self,
            _center: Coordinates,
            _radius: u32,
            category: Category,
        ) -> Result<u32> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(category as u32 + 1)
        }
    }

    #[tokio::test]
    async fn test_default_limits_queries_in_flight() {
        let extractor = FeatureExtractor::new(SlowSource::default());

        let counts = extractor.extract(center(), 500).await;

        assert_eq!(counts, FeatureCounts::new(1, 2, 3));
        assert_eq!(extractor.source.peak.load(Ordering::SeqCst), OVERPASS_MAX_CONCURRENT);
    }

    #[tokio::test]
    async fn test_single_slot_runs_sequentially() {
        let extractor = FeatureExtractor::with_max_concurrent(SlowSource::default(), 1);

        let extraction = extractor.extract_detailed(center(), 500).await;

        assert!(extraction.failed.is_empty());
        assert_eq!(extractor.source.peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_feature_vector_order() {
        let counts = FeatureCounts::new(2, 30, 5);
        assert_eq!(counts.as_features(), [2.0, 30.0, 5.0]);
    }

    #[test]
    fn test_taxonomy() {
        assert_eq!(Category::Competitors.tags().len(), 1);
        assert!(Category::Drivers
            .tags()
            .iter()
            .any(|t| t.key == "office" && t.values == TagValues::Any));
        assert!(Category::Leisure.tags().iter().any(|t| t.key == "shop"));
    }
}
