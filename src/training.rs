// 🧮 Training Pipeline - split, fit, score
// Ties the synthetic dataset, encoder, and forest together. The binary in
// src/main.rs drives this and does the talking; failures propagate and
// abort the job.

use anyhow::Result;

use crate::forest::{ForestParams, ForestRegressor};
use crate::synthetic::train_test_split;

/// Held-out fraction for evaluation
pub const TEST_FRACTION: f64 = 0.2;

/// Fit a forest on a seeded 80/20 shuffle split and score it on the held-out
/// rows. Returns the fitted forest and its R².
///
/// Saving never gates on the score; the caller persists whatever comes out.
pub fn train_forest(
    x: &[Vec<f64>],
    y: &[f64],
    params: ForestParams,
    split_seed: u64,
) -> Result<(ForestRegressor, f64)> {
    let (train_idx, test_idx) = train_test_split(x.len(), TEST_FRACTION, split_seed);

    let x_train: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
    let y_train: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
    let x_test: Vec<Vec<f64>> = test_idx.iter().map(|&i| x[i].clone()).collect();
    let y_test: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();

    let forest = ForestRegressor::fit(&x_train, &y_train, params)?;
    let score = forest.score(&x_test, &y_test);

    Ok((forest, score))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::LabelEncoder;
    use crate::synthetic::{feature_matrix, generate_sample_data};

    fn small_params() -> ForestParams {
        ForestParams {
            n_trees: 10,
            max_depth: 6,
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_pipeline_produces_finite_score() {
        let rows = generate_sample_data(200, 42);
        let encoder = LabelEncoder::fit(rows.iter().map(|r| r.category.as_str()));
        let (x, y) = feature_matrix(&rows, &encoder).unwrap();

        let (forest, score) = train_forest(&x, &y, small_params(), 42).unwrap();

        assert!(score.is_finite());
        assert_eq!(forest.n_trees(), 10);
    }

    #[test]
    fn test_training_is_reproducible() {
        // Same seed end to end: identical encoder mapping, identical score
        let rows_a = generate_sample_data(200, 42);
        let rows_b = generate_sample_data(200, 42);

        let encoder_a = LabelEncoder::fit(rows_a.iter().map(|r| r.category.as_str()));
        let encoder_b = LabelEncoder::fit(rows_b.iter().map(|r| r.category.as_str()));
        assert_eq!(encoder_a, encoder_b);

        let (x_a, y_a) = feature_matrix(&rows_a, &encoder_a).unwrap();
        let (x_b, y_b) = feature_matrix(&rows_b, &encoder_b).unwrap();

        let (_, score_a) = train_forest(&x_a, &y_a, small_params(), 42).unwrap();
        let (_, score_b) = train_forest(&x_b, &y_b, small_params(), 42).unwrap();

        assert_eq!(score_a, score_b);
    }

    #[test]
    fn test_encoder_covers_all_generated_categories() {
        let rows = generate_sample_data(1000, 42);
        let encoder = LabelEncoder::fit(rows.iter().map(|r| r.category.as_str()));

        assert_eq!(
            encoder.classes(),
            &[
                "accommodation",
                "entertainment",
                "food",
                "other",
                "shopping",
                "transportation",
            ]
        );
    }
}
