//! Bagged CART classifier for the binary match label.
//!
//! Each tree is grown on a bootstrap sample with Gini splits over a random
//! subset of `sqrt(n_features)` features, down to pure leaves unless a depth
//! limit is set. Leaves store the fraction of positive samples; the forest
//! probability is the mean over trees.

use crate::domain::model::{ModelParams, PairFeatures};
use crate::utils::error::{ReconError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub type FeatureVector = [f64; PairFeatures::COUNT];

#[derive(Debug, Clone, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: usize,
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::from(&ModelParams::default())
    }
}

impl From<&ModelParams> for ForestParams {
    fn from(params: &ModelParams) -> Self {
        Self {
            n_estimators: params.n_estimators,
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
            max_features: ((PairFeatures::COUNT as f64).sqrt() as usize).max(1),
            random_state: params.random_state,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        p_match: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    weighted_impurity: f64,
}

// Gini impurity scaled by node size: n * 2p(1-p).
fn weighted_gini(n: usize, positives: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    n as f64 * 2.0 * p * (1.0 - p)
}

impl DecisionTree {
    fn fit(x: &[FeatureVector], y: &[u8], samples: Vec<usize>, params: &ForestParams, rng: &mut StdRng) -> Self {
        let mut nodes = vec![Node::Leaf { p_match: 0.0 }];
        let mut stack = vec![(0usize, samples, 0usize)];

        while let Some((id, samples, depth)) = stack.pop() {
            let positives = samples.iter().filter(|&&i| y[i] == 1).count();
            let p_match = positives as f64 / samples.len() as f64;

            let pure = positives == 0 || positives == samples.len();
            let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
            if pure || depth_reached || samples.len() < params.min_samples_split {
                nodes[id] = Node::Leaf { p_match };
                continue;
            }

            let Some(split) = best_split(x, y, &samples, params.max_features, rng) else {
                nodes[id] = Node::Leaf { p_match };
                continue;
            };

            let (left, right): (Vec<usize>, Vec<usize>) = samples
                .into_iter()
                .partition(|&i| x[i][split.feature] <= split.threshold);

            let left_id = nodes.len();
            let right_id = left_id + 1;
            nodes.push(Node::Leaf { p_match: 0.0 });
            nodes.push(Node::Leaf { p_match: 0.0 });
            nodes[id] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left: left_id,
                right: right_id,
            };

            stack.push((left_id, left, depth + 1));
            stack.push((right_id, right, depth + 1));
        }

        Self { nodes }
    }

    fn p_match(&self, row: &FeatureVector) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                Node::Leaf { p_match } => return p_match,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => id = if row[feature] <= threshold { left } else { right },
            }
        }
    }

    fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = self.nodes[id] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        max_depth
    }
}

/// Best Gini split over up to `max_features` non-constant features, drawn in random order.
fn best_split(
    x: &[FeatureVector],
    y: &[u8],
    samples: &[usize],
    max_features: usize,
    rng: &mut StdRng,
) -> Option<SplitCandidate> {
    let mut features: Vec<usize> = (0..PairFeatures::COUNT).collect();
    features.shuffle(rng);

    let total = samples.len();
    let total_positives = samples.iter().filter(|&&i| y[i] == 1).count();
    let mut best: Option<SplitCandidate> = None;
    let mut visited = 0;

    for feature in features {
        if visited >= max_features {
            break;
        }

        let mut column: Vec<(f64, u8)> = samples.iter().map(|&i| (x[i][feature], y[i])).collect();
        column.sort_by(|a, b| a.0.total_cmp(&b.0));
        if column[0].0 >= column[total - 1].0 {
            // Constant here; does not count toward max_features.
            continue;
        }
        visited += 1;

        let mut left_positives = 0;
        for k in 0..total - 1 {
            left_positives += usize::from(column[k].1 == 1);
            let (lo, hi) = (column[k].0, column[k + 1].0);
            if lo >= hi {
                continue;
            }

            let left_n = k + 1;
            let impurity = weighted_gini(left_n, left_positives)
                + weighted_gini(total - left_n, total_positives - left_positives);

            if best.map_or(true, |b| impurity < b.weighted_impurity) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    weighted_impurity: impurity,
                });
            }
        }
    }

    best
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    classes: Vec<u8>,
}

impl RandomForest {
    pub fn fit(x: &[FeatureVector], y: &[u8], params: &ForestParams) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(ReconError::InsufficientData {
                message: format!("cannot fit on {} rows with {} labels", x.len(), y.len()),
            });
        }
        if params.n_estimators == 0 {
            return Err(ReconError::InvalidConfigValueError {
                field: "model.n_estimators".to_string(),
                value: "0".to_string(),
                reason: "Value must be at least 1".to_string(),
            });
        }

        let mut classes: Vec<u8> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        if classes.len() == 1 {
            tracing::warn!(
                "All {} training labels are {}; every pair gets the same prediction",
                y.len(),
                classes[0]
            );
            return Ok(Self {
                trees: Vec::new(),
                classes,
            });
        }

        let n = x.len();
        let trees: Vec<DecisionTree> = (0..params.n_estimators)
            .map(|k| {
                let mut rng = StdRng::seed_from_u64(params.random_state.wrapping_add(k as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, bootstrap, params, &mut rng)
            })
            .collect();

        tracing::debug!(
            "Fitted {} trees on {} rows (max depth {})",
            trees.len(),
            n,
            trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
        );

        Ok(Self { trees, classes })
    }

    /// Sorted distinct labels seen during fitting.
    pub fn classes(&self) -> &[u8] {
        &self.classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Probability of the match class (label 1).
    pub fn predict_proba_match(&self, row: &FeatureVector) -> f64 {
        self.class_probabilities(row).1
    }

    /// Label with the highest probability; ties go to the lower label.
    pub fn predict(&self, row: &FeatureVector) -> u8 {
        if let [only] = self.classes.as_slice() {
            return *only;
        }
        let (p_other, p_match) = self.class_probabilities(row);
        u8::from(p_match > p_other)
    }

    pub fn score(&self, x: &[FeatureVector], y: &[u8]) -> f64 {
        if x.is_empty() {
            return 0.0;
        }
        let correct = x
            .iter()
            .zip(y)
            .filter(|(row, &label)| self.predict(row) == label)
            .count();
        correct as f64 / x.len() as f64
    }

    fn class_probabilities(&self, row: &FeatureVector) -> (f64, f64) {
        if let [only] = self.classes.as_slice() {
            return if *only == 1 { (0.0, 1.0) } else { (1.0, 0.0) };
        }

        let (sum_other, sum_match) = self.trees.iter().fold((0.0, 0.0), |(s0, s1), tree| {
            let p = tree.p_match(row);
            (s0 + (1.0 - p), s1 + p)
        });
        let n = self.trees.len() as f64;
        (sum_other / n, sum_match / n)
    }
}
