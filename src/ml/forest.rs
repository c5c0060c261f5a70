// ============================================================
// Layer 5 — Random Forest Regressor
// ============================================================
// An averaging ensemble of CART regression trees, trained on the
// UNSCALED selling price (no target scaler anywhere near this
// model — its trees average real rupee values).
//
// Training, per tree:
//   1. Draw a bootstrap sample (n rows with replacement) using an
//      rng seeded `seed + tree_index`, so a fixed seed reproduces
//      the exact same forest on the same table.
//   2. Grow a binary tree greedily: at every node, scan every
//      feature for the threshold that minimises the summed
//      within-side variance of the targets (the classic CART
//      variance-reduction criterion).
//   3. Stop at max_depth, at fewer than 2 samples, or when no
//      feature separates the remaining rows; the leaf predicts
//      the mean target of its rows.
//
// Prediction: route the feature vector down each tree, average
// the leaf values. All features are considered at every split;
// the bootstrap alone decorrelates the trees.
//
// The whole model is plain serde data, so the artifact store can
// persist it as JSON next to the pipeline.
//
// Reference: Breiman (2001) Random Forests

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Splitting stops below this many samples at a node.
const MIN_SAMPLES_SPLIT: usize = 2;

// ─── TreeNode ─────────────────────────────────────────────────────────────────
/// One node of a fitted regression tree. Rows with
/// feature[feature] <= threshold go left, the rest go right.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature:   usize,
        threshold: f64,
        left:      Box<TreeNode>,
        right:     Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, row: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split { feature, threshold, left, right } => {
                if row[*feature] <= *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

// ─── DecisionTree ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    /// Grow a tree on the rows selected by `indices` (the bootstrap
    /// sample — indices repeat, and that repetition is the point).
    fn fit(x: &[Vec<f64>], y: &[f64], indices: Vec<usize>, max_depth: Option<usize>) -> Self {
        Self { root: grow(x, y, indices, 0, max_depth) }
    }

    fn predict(&self, row: &[f64]) -> f64 {
        self.root.predict(row)
    }
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn grow(
    x: &[Vec<f64>],
    y: &[f64],
    indices: Vec<usize>,
    depth: usize,
    max_depth: Option<usize>,
) -> TreeNode {
    let at_depth_limit = max_depth.is_some_and(|d| depth >= d);
    if at_depth_limit || indices.len() < MIN_SAMPLES_SPLIT {
        return TreeNode::Leaf { value: mean_of(y, &indices) };
    }

    match best_split(x, y, &indices) {
        None => TreeNode::Leaf { value: mean_of(y, &indices) },
        Some(split) => {
            let (mut left_idx, mut right_idx) = (Vec::new(), Vec::new());
            for &i in &indices {
                if x[i][split.feature] <= split.threshold {
                    left_idx.push(i);
                } else {
                    right_idx.push(i);
                }
            }
            TreeNode::Split {
                feature:   split.feature,
                threshold: split.threshold,
                left:  Box::new(grow(x, y, left_idx, depth + 1, max_depth)),
                right: Box::new(grow(x, y, right_idx, depth + 1, max_depth)),
            }
        }
    }
}

struct BestSplit {
    feature:   usize,
    threshold: f64,
}

/// Scan every feature for the threshold minimising the summed
/// within-side sum of squared deviations. One sort per feature,
/// then a single prefix-sum sweep over the candidate cut points.
/// Returns None when no feature separates the rows (all values
/// equal) or the targets carry no variance worth splitting.
fn best_split(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<BestSplit> {
    let n = indices.len();
    let n_features = x[indices[0]].len();

    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq:  f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    // sum of squared deviations of the unsplit node
    let parent_cost = total_sq - total_sum * total_sum / n as f64;
    if parent_cost <= 1e-12 {
        return None;
    }

    let mut best: Option<(f64, BestSplit)> = None;

    for feature in 0..n_features {
        // Sort this node's rows by the candidate feature
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| x[a][feature].partial_cmp(&x[b][feature]).unwrap());

        let mut left_sum = 0.0;
        let mut left_sq  = 0.0;

        for cut in 1..n {
            let prev = order[cut - 1];
            left_sum += y[prev];
            left_sq  += y[prev] * y[prev];

            // Only cut between distinct feature values
            let lo = x[prev][feature];
            let hi = x[order[cut]][feature];
            if hi <= lo {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq  = total_sq - left_sq;
            let n_left  = cut as f64;
            let n_right = (n - cut) as f64;

            let cost = (left_sq - left_sum * left_sum / n_left)
                     + (right_sq - right_sum * right_sum / n_right);

            let improves = match &best {
                Some((best_cost, _)) => cost < *best_cost,
                None => cost < parent_cost,
            };
            if improves {
                best = Some((cost, BestSplit { feature, threshold: (lo + hi) / 2.0 }));
            }
        }
    }

    best.map(|(_, split)| split)
}

// ─── ForestRegressor ──────────────────────────────────────────────────────────
/// The fitted ensemble. Built with the builder methods, fitted
/// once, then read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestRegressor {
    trees:       Vec<DecisionTree>,
    n_trees:     usize,
    max_depth:   Option<usize>,
    seed:        u64,
    /// Feature arity the forest was fitted on — predictions with a
    /// differently-shaped vector are rejected, not silently wrong
    feature_len: usize,
}

impl ForestRegressor {
    pub fn new(n_trees: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_trees,
            max_depth: None,
            seed: 0,
            feature_len: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn feature_len(&self) -> usize {
        self.feature_len
    }

    /// Fit the ensemble on the transformed feature matrix and the
    /// raw (unscaled) prices.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        if x.is_empty() {
            bail!("cannot fit a forest on an empty feature matrix");
        }
        if x.len() != y.len() {
            bail!("feature matrix has {} rows but target has {} values", x.len(), y.len());
        }
        if self.n_trees == 0 {
            bail!("ensemble size must be at least 1");
        }

        let n = x.len();
        let seed = self.seed;
        let max_depth = self.max_depth;
        self.feature_len = x[0].len();
        self.trees = (0..self.n_trees)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, bootstrap, max_depth)
            })
            .collect();

        let deepest = self.trees.iter().map(|t| t.root.depth()).max().unwrap_or(0);
        tracing::info!(
            "Fitted forest: {} trees over {} rows, deepest tree {} levels",
            self.trees.len(), n, deepest,
        );
        Ok(())
    }

    /// Average the trees' leaf values for one feature vector.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// y = step over the first feature; second feature is noise
    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let v = i as f64 / 40.0;
            x.push(vec![v, (i % 7) as f64]);
            y.push(if v < 0.5 { 10.0 } else { 20.0 });
        }
        (x, y)
    }

    #[test]
    fn test_learns_a_step_function() {
        let (x, y) = step_data();
        let mut forest = ForestRegressor::new(25).with_seed(42);
        forest.fit(&x, &y).unwrap();
        assert!((forest.predict_row(&[0.1, 3.0]) - 10.0).abs() < 1.5);
        assert!((forest.predict_row(&[0.9, 3.0]) - 20.0).abs() < 1.5);
    }

    #[test]
    fn test_constant_target_predicts_constant() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y = vec![7.5; 10];
        let mut forest = ForestRegressor::new(10).with_seed(1);
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.predict_row(&[4.0]), 7.5);
    }

    #[test]
    fn test_same_seed_reproduces_predictions() {
        let (x, y) = step_data();
        let held_out = [0.37, 2.0];

        let mut a = ForestRegressor::new(15).with_seed(42);
        a.fit(&x, &y).unwrap();
        let mut b = ForestRegressor::new(15).with_seed(42);
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict_row(&held_out), b.predict_row(&held_out));
    }

    #[test]
    fn test_prediction_stays_in_target_range() {
        // Leaves average observed targets, so the ensemble can never
        // extrapolate outside [min(y), max(y)] — even far out of range
        let (x, y) = step_data();
        let mut forest = ForestRegressor::new(15).with_seed(3);
        forest.fit(&x, &y).unwrap();
        let p = forest.predict_row(&[1000.0, -50.0]);
        assert!((10.0..=20.0).contains(&p));
    }

    #[test]
    fn test_empty_matrix_is_an_error() {
        let mut forest = ForestRegressor::new(5);
        assert!(forest.fit(&[], &[]).is_err());
    }

    #[test]
    fn test_row_count_mismatch_is_an_error() {
        let mut forest = ForestRegressor::new(5);
        assert!(forest.fit(&[vec![1.0]], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_serde_round_trip_preserves_predictions() {
        let (x, y) = step_data();
        let mut forest = ForestRegressor::new(8).with_seed(9).with_max_depth(Some(6));
        forest.fit(&x, &y).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let restored: ForestRegressor = serde_json::from_str(&json).unwrap();
        assert_eq!(forest.predict_row(&[0.2, 1.0]), restored.predict_row(&[0.2, 1.0]));
        assert_eq!(restored.feature_len(), 2);
    }
}
