//! Random forest regressor
//!
//! Bagged regression trees: every tree is fit on a bootstrap resample of the
//! training rows and the forest predicts the mean of its trees.

use crate::model::tree::{DecisionTree, TreeConfig};
use crate::model::Dataset;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random Forest configuration
#[derive(Debug, Clone)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = unlimited)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed; tree `i` uses `seed + i`
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random Forest model
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    /// Train the random forest
    pub fn fit(&mut self, dataset: &Dataset) {
        let n_samples = dataset.n_samples();
        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
        };

        self.trees = (0..self.config.n_trees)
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(i as u64));

                let indices: Vec<usize> = if self.config.bootstrap && n_samples > 0 {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };

                let mut tree = DecisionTree::new(tree_config.clone());
                tree.fit(dataset, &indices, &mut rng);
                tree
            })
            .collect();
    }

    /// Predict for a single sample (0.0 when unfitted)
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        let total: f64 = self.trees.iter().map(|t| t.predict_one(features)).sum();
        total / self.trees.len() as f64
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Deepest tree in the forest
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
    }

    /// Calculate R² score
    pub fn r2_score(&self, dataset: &Dataset) -> f64 {
        let n = dataset.n_samples() as f64;
        let mean_label = dataset.labels.iter().sum::<f64>() / n;

        let ss_res: f64 = dataset
            .features
            .iter()
            .zip(&dataset.labels)
            .map(|(x, y)| (y - self.predict_one(x)).powi(2))
            .sum();
        let ss_tot: f64 = dataset.labels.iter().map(|y| (y - mean_label).powi(2)).sum();

        if ss_tot == 0.0 {
            0.0
        } else {
            1.0 - ss_res / ss_tot
        }
    }
}
