// 🌲 Forest Regressor - Bagged regression trees
// Variance-reduction splits, bootstrap sampling per tree, mean prediction
// across the ensemble. Fully serializable so the fitted forest IS the
// on-disk artifact.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub n_trees: usize,

    /// Maximum tree depth
    pub max_depth: usize,

    /// Minimum samples required to split a node
    pub min_samples_split: usize,

    /// Features considered per split; None = all features
    pub max_features: Option<usize>,

    /// RNG seed for bootstrap and feature sampling
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        ForestParams {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

// ============================================================================
// DECISION TREE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Single regression tree. Rows go left when `row[feature] <= threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
        params: &ForestParams,
        rng: &mut StdRng,
    ) -> Self {
        DecisionTree {
            root: grow(x, y, indices, 0, params, rng),
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn mean(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

/// Sum of squared errors around the mean, from running sums:
/// SSE = Σy² - (Σy)² / n
fn sse(sum: f64, sum_sq: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    sum_sq - sum * sum / n as f64
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    cost: f64,
}

fn grow(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    depth: usize,
    params: &ForestParams,
    rng: &mut StdRng,
) -> Node {
    if depth >= params.max_depth || indices.len() < params.min_samples_split {
        return Node::Leaf {
            value: mean(y, indices),
        };
    }

    let n_features = x[indices[0]].len();
    let candidate_features: Vec<usize> = match params.max_features {
        Some(m) if m < n_features => {
            let all: Vec<usize> = (0..n_features).collect();
            all.choose_multiple(rng, m).copied().collect()
        }
        _ => (0..n_features).collect(),
    };

    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let node_cost = sse(total_sum, total_sq, indices.len());

    let mut best: Option<BestSplit> = None;

    for &feature in &candidate_features {
        let mut pairs: Vec<(f64, f64)> = indices.iter().map(|&i| (x[i][feature], y[i])).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 0..pairs.len() - 1 {
            left_sum += pairs[i].1;
            left_sq += pairs[i].1 * pairs[i].1;

            // Only split between distinct feature values
            if pairs[i].0 == pairs[i + 1].0 {
                continue;
            }

            let n_left = i + 1;
            let n_right = pairs.len() - n_left;
            let cost = sse(left_sum, left_sq, n_left)
                + sse(total_sum - left_sum, total_sq - left_sq, n_right);

            if best.as_ref().map_or(cost < node_cost, |b| cost < b.cost) {
                best = Some(BestSplit {
                    feature,
                    threshold: (pairs[i].0 + pairs[i + 1].0) / 2.0,
                    cost,
                });
            }
        }
    }

    let Some(split) = best else {
        return Node::Leaf {
            value: mean(y, indices),
        };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[i][split.feature] <= split.threshold);

    if left_idx.is_empty() || right_idx.is_empty() {
        return Node::Leaf {
            value: mean(y, indices),
        };
    }

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(x, y, &left_idx, depth + 1, params, rng)),
        right: Box::new(grow(x, y, &right_idx, depth + 1, params, rng)),
    }
}

// ============================================================================
// FOREST
// ============================================================================

/// Bagged ensemble of regression trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestRegressor {
    params: ForestParams,
    trees: Vec<DecisionTree>,
}

impl ForestRegressor {
    /// Fit the ensemble. Each tree trains on a bootstrap sample of the rows.
    ///
    /// Deterministic: the seeded RNG drives bootstrap and feature sampling in
    /// a fixed order, so the same inputs and seed reproduce the same forest.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: ForestParams) -> Result<Self> {
        if x.is_empty() {
            bail!("cannot fit forest on an empty dataset");
        }
        if x.len() != y.len() {
            bail!(
                "feature/target length mismatch: {} rows vs {} targets",
                x.len(),
                y.len()
            );
        }

        let mut rng = StdRng::seed_from_u64(params.seed);
        let n = x.len();

        let trees = (0..params.n_trees)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, &sample, &params, &mut rng)
            })
            .collect();

        Ok(ForestRegressor { params, trees })
    }

    /// Predict one row: mean prediction across all trees.
    pub fn predict(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict(row)).sum::<f64>() / self.trees.len() as f64
    }

    /// Coefficient of determination (R²) on a held-out set.
    pub fn score(&self, x: &[Vec<f64>], y: &[f64]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let y_mean = y.iter().sum::<f64>() / y.len() as f64;
        let ss_res: f64 = x
            .iter()
            .zip(y)
            .map(|(row, &target)| {
                let err = target - self.predict(row);
                err * err
            })
            .sum();
        let ss_tot: f64 = y.iter().map(|&t| (t - y_mean) * (t - y_mean)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params(n_trees: usize) -> ForestParams {
        ForestParams {
            n_trees,
            max_depth: 8,
            ..ForestParams::default()
        }
    }

    /// y = 3*x0 + x1 over a small grid
    fn linear_dataset() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for a in 0..20 {
            for b in 0..10 {
                x.push(vec![a as f64, b as f64]);
                y.push(3.0 * a as f64 + b as f64);
            }
        }
        (x, y)
    }

    #[test]
    fn test_constant_target_predicts_constant() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let y = vec![7.5, 7.5, 7.5, 7.5];

        let forest = ForestRegressor::fit(&x, &y, small_params(5)).unwrap();

        assert!((forest.predict(&[2.5]) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_learns_linear_relation() {
        let (x, y) = linear_dataset();
        let forest = ForestRegressor::fit(&x, &y, small_params(20)).unwrap();

        let score = forest.score(&x, &y);
        assert!(score > 0.9, "expected R² > 0.9, got {score}");
    }

    #[test]
    fn test_beats_mean_predictor() {
        let (x, y) = linear_dataset();
        let forest = ForestRegressor::fit(&x, &y, small_params(10)).unwrap();

        // The mean predictor has R² == 0 by definition
        assert!(forest.score(&x, &y) > 0.0);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = linear_dataset();
        let a = ForestRegressor::fit(&x, &y, small_params(10)).unwrap();
        let b = ForestRegressor::fit(&x, &y, small_params(10)).unwrap();

        for row in &x {
            assert_eq!(a.predict(row), b.predict(row));
        }
        assert_eq!(a.score(&x, &y), b.score(&x, &y));
    }

    #[test]
    fn test_feature_subsampling_still_fits() {
        let (x, y) = linear_dataset();
        let params = ForestParams {
            n_trees: 20,
            max_features: Some(1),
            ..ForestParams::default()
        };
        let forest = ForestRegressor::fit(&x, &y, params).unwrap();

        assert!(forest.score(&x, &y) > 0.5);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(ForestRegressor::fit(&[], &[], small_params(2)).is_err());
        assert!(ForestRegressor::fit(&[vec![1.0]], &[1.0, 2.0], small_params(2)).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let (x, y) = linear_dataset();
        let forest = ForestRegressor::fit(&x, &y, small_params(3)).unwrap();

        let json = serde_json::to_string(&forest).unwrap();
        let restored: ForestRegressor = serde_json::from_str(&json).unwrap();

        assert_eq!(forest.predict(&x[5]), restored.predict(&x[5]));
        assert_eq!(restored.n_trees(), 3);
    }
}
