//! Revenue models
//!
//! One random forest per persona, fit once at startup on synthetic rows. The
//! trained pair is immutable and shared by reference.

pub mod forest;
pub mod tree;

use crate::constants::training::{SAMPLES, SEED, TREES};
use crate::features::FeatureCounts;
use crate::forecast::Persona;
use forest::{ForestConfig, RandomForest};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, info};

/// Training rows: one feature vector and one label per sample
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
}

impl Dataset {
    pub fn new(feature_names: Vec<String>) -> Self {
        Self {
            feature_names,
            features: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn add_sample(&mut self, features: Vec<f64>, label: f64) {
        self.features.push(features);
        self.labels.push(label);
    }

    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

/// Draw `n` synthetic sites
///
/// Columns are sampled one after another: every competitor count first, then
/// drivers, then leisure.
pub fn synthetic_sites(seed: u64, n: usize) -> Vec<FeatureCounts> {
    let mut rng = StdRng::seed_from_u64(seed);

    let competitors: Vec<u32> = (0..n).map(|_| rng.gen_range(0..15)).collect();
    let drivers: Vec<u32> = (0..n).map(|_| rng.gen_range(5..50)).collect();
    let leisure: Vec<u32> = (0..n).map(|_| rng.gen_range(0..10)).collect();

    (0..n)
        .map(|i| FeatureCounts::new(competitors[i], drivers[i], leisure[i]))
        .collect()
}

/// Synthetic monthly revenue for a site
///
/// Premium tolerates competition; Budget is hurt by it and ignores leisure.
pub fn synthetic_revenue(persona: Persona, site: &FeatureCounts) -> f64 {
    let competitors = site.competitors as f64;
    let drivers = site.drivers as f64;
    let leisure = site.leisure as f64;

    match persona {
        Persona::Premium => 5000.0 + leisure * 300.0 + drivers * 100.0 + competitors * 50.0,
        Persona::Budget => 2000.0 + drivers * 150.0 - competitors * 100.0,
    }
}

/// Labelled training set for one persona
pub fn training_set(persona: Persona, sites: &[FeatureCounts]) -> Dataset {
    let mut dataset = Dataset::new(vec![
        "competitors".to_string(),
        "drivers".to_string(),
        "leisure".to_string(),
    ]);
    for site in sites {
        dataset.add_sample(site.as_features().to_vec(), synthetic_revenue(persona, site));
    }
    dataset
}

/// The fitted model pair
#[derive(Debug, Clone)]
pub struct ForecastModels {
    premium: RandomForest,
    budget: RandomForest,
}

impl ForecastModels {
    /// Train both persona models with the default seed
    pub fn train_default() -> Self {
        Self::train(SEED)
    }

    /// Train both persona models; identical seeds give identical models
    pub fn train(seed: u64) -> Self {
        let started = Instant::now();
        let sites = synthetic_sites(seed, SAMPLES);

        let fit = |persona: Persona| {
            let mut forest = RandomForest::new(ForestConfig {
                n_trees: TREES,
                seed,
                ..Default::default()
            });
            let dataset = training_set(persona, &sites);
            forest.fit(&dataset);
            debug!(
                "{} forest: {} trees, max depth {}, training R² {:.3}",
                persona,
                forest.n_trees(),
                forest.max_depth(),
                forest.r2_score(&dataset)
            );
            forest
        };

        let models = Self {
            premium: fit(Persona::Premium),
            budget: fit(Persona::Budget),
        };

        info!(
            "Trained forecast models ({} rows, {} trees each) in {:?}",
            SAMPLES,
            TREES,
            started.elapsed()
        );

        models
    }

    /// Model for a persona
    pub fn for_persona(&self, persona: Persona) -> &RandomForest {
        match persona {
            Persona::Premium => &self.premium,
            Persona::Budget => &self.budget,
        }
    }

    /// Raw model output for a site
    pub fn predict(&self, persona: Persona, counts: &FeatureCounts) -> f64 {
        self.for_persona(persona).predict_one(&counts.as_features())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::OnceLock;

    pub(crate) fn models() -> &'static ForecastModels {
        static MODELS: OnceLock<ForecastModels> = OnceLock::new();
        MODELS.get_or_init(ForecastModels::train_default)
    }

    fn label_range(persona: Persona) -> (f64, f64) {
        synthetic_sites(SEED, SAMPLES)
            .iter()
            .map(|s| synthetic_revenue(persona, s))
            .fold((f64::MAX, f64::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)))
    }

    #[test]
    fn test_synthetic_sites_ranges() {
        let sites = synthetic_sites(SEED, SAMPLES);
        assert_eq!(sites.len(), 200);
        for site in &sites {
            assert!(site.competitors < 15);
            assert!((5..50).contains(&site.drivers));
            assert!(site.leisure < 10);
        }
    }

    #[test]
    fn test_synthetic_sites_deterministic() {
        assert_eq!(synthetic_sites(42, 50), synthetic_sites(42, 50));
        assert_ne!(synthetic_sites(42, 50), synthetic_sites(43, 50));
    }

    #[test]
    fn test_synthetic_revenue_formulas() {
        let site = FeatureCounts::new(2, 30, 5);
        assert_eq!(synthetic_revenue(Persona::Premium, &site), 5000.0 + 1500.0 + 3000.0 + 100.0);
        assert_eq!(synthetic_revenue(Persona::Budget, &site), 2000.0 + 4500.0 - 200.0);

        // budget revenue ignores leisure
        let more_leisure = FeatureCounts::new(2, 30, 9);
        assert_eq!(
            synthetic_revenue(Persona::Budget, &site),
            synthetic_revenue(Persona::Budget, &more_leisure)
        );
    }

    #[test]
    fn test_training_is_deterministic() {
        let a = ForecastModels::train(SEED);
        let b = models();
        for counts in [
            FeatureCounts::new(2, 30, 5),
            FeatureCounts::new(10, 20, 1),
            FeatureCounts::new(0, 49, 9),
        ] {
            for persona in Persona::ALL {
                assert_eq!(a.predict(persona, &counts), b.predict(persona, &counts));
            }
        }
    }

    #[test]
    fn test_predictions_within_training_targets() {
        let models = models();
        for persona in Persona::ALL {
            let (lo, hi) = label_range(persona);
            for counts in [
                FeatureCounts::new(0, 1, 0),
                FeatureCounts::new(50, 500, 50),
                FeatureCounts::new(7, 25, 4),
            ] {
                let p = models.predict(persona, &counts);
                assert!(
                    p >= lo && p <= hi,
                    "{:?} prediction {} outside [{}, {}]",
                    persona,
                    p,
                    lo,
                    hi
                );
            }
        }
    }

    #[test]
    fn test_models_follow_synthetic_trend() {
        let models = models();

        let crowded = FeatureCounts::new(14, 6, 0);
        let open = FeatureCounts::new(0, 45, 0);
        assert!(models.predict(Persona::Budget, &open) > models.predict(Persona::Budget, &crowded));

        let plain = FeatureCounts::new(5, 8, 0);
        let lively = FeatureCounts::new(5, 45, 9);
        assert!(
            models.predict(Persona::Premium, &lively) > models.predict(Persona::Premium, &plain)
        );
    }

    #[test]
    fn test_models_fit_training_data() {
        let models = models();
        let sites = synthetic_sites(SEED, SAMPLES);
        for persona in Persona::ALL {
            let r2 = models.for_persona(persona).r2_score(&training_set(persona, &sites));
            assert!(r2 > 0.9, "{:?} r2 = {}", persona, r2);
        }
    }
}
