//! Regression tree
//!
//! CART-style binary tree with mean-squared-error splits. Thresholds sit at the
//! midpoint between adjacent distinct feature values; a sample goes left when
//! its value is `<=` the threshold.

use crate::model::Dataset;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Decision tree configuration
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Maximum depth of tree (None = grow until pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

/// Regression tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    config: TreeConfig,
    root: Option<Node>,
}

impl DecisionTree {
    pub fn new(config: TreeConfig) -> Self {
        Self { config, root: None }
    }

    /// Fit on the rows of `dataset` selected by `indices` (repeats allowed)
    ///
    /// `rng` only decides the order in which features are tried, which breaks
    /// ties between equally good splits.
    pub fn fit(&mut self, dataset: &Dataset, indices: &[usize], rng: &mut StdRng) {
        self.root = if indices.is_empty() {
            None
        } else {
            Some(self.build(dataset, indices.to_vec(), 0, rng))
        };
    }

    fn build(
        &self,
        dataset: &Dataset,
        indices: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> Node {
        let n = indices.len();
        let (sum, sum_sq) = sums(dataset, &indices);
        let mean = sum / n as f64;
        let sse = sum_sq - sum * sum / n as f64;

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || n < self.config.min_samples_split || sse <= 1e-9 {
            return Node::Leaf { value: mean };
        }

        match self.best_split(dataset, &indices, sse, rng) {
            Some(split) => {
                let left = self.build(dataset, split.left, depth + 1, rng);
                let right = self.build(dataset, split.right, depth + 1, rng);
                Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
            None => Node::Leaf { value: mean },
        }
    }

    /// Sweep every feature in sorted order, tracking running sums
    fn best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        parent_sse: f64,
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let min_leaf = self.config.min_samples_leaf.max(1);
        let n = indices.len();

        let mut features: Vec<usize> = (0..dataset.n_features()).collect();
        features.shuffle(rng);

        let mut best: Option<BestSplit> = None;
        let mut best_sse = parent_sse - 1e-9;

        for feature in features {
            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| {
                dataset.features[a][feature].total_cmp(&dataset.features[b][feature])
            });

            let (total, total_sq) = sums(dataset, &sorted);
            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for i in 0..n - 1 {
                let y = dataset.labels[sorted[i]];
                left_sum += y;
                left_sq += y * y;

                let here = dataset.features[sorted[i]][feature];
                let next = dataset.features[sorted[i + 1]][feature];
                let n_left = i + 1;
                let n_right = n - n_left;
                if here == next || n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);

                if sse < best_sse {
                    best_sse = sse;
                    best = Some(BestSplit {
                        feature,
                        threshold: (here + next) / 2.0,
                        sse,
                        left: sorted[..n_left].to_vec(),
                        right: sorted[n_left..].to_vec(),
                    });
                }
            }
        }

        best.filter(|split| split.sse < parent_sse)
    }

    /// Predict for a single sample
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let mut node = match &self.root {
            Some(root) => root,
            None => return 0.0,
        };

        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold { &**left } else { &**right };
                }
            }
        }
    }

    /// Number of levels, counting the root
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        self.root.as_ref().map(walk).unwrap_or(0)
    }
}

fn sums(dataset: &Dataset, indices: &[usize]) -> (f64, f64) {
    indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
        let y = dataset.labels[i];
        (s + y, sq + y * y)
    })
}
