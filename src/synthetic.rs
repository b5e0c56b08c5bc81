// 🎲 Synthetic Dataset - Seeded training data generator
// Produces the labeled expense rows the training job fits on. Amounts follow
// per-category normal distributions; trip parameters are uniform draws.
// Everything is reproducible under a fixed seed.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::encoder::LabelEncoder;

// ============================================================================
// CATEGORIES
// ============================================================================

/// Expense categories in generation order (the encoder re-sorts them)
pub const CATEGORIES: [&str; 6] = [
    "food",
    "accommodation",
    "transportation",
    "entertainment",
    "shopping",
    "other",
];

/// Default RNG seed for the training job
pub const DEFAULT_SEED: u64 = 42;

/// Number of synthetic rows generated per training run
pub const SAMPLE_SIZE: usize = 1000;

/// Amounts below this are clamped up (no free lunches)
const MIN_AMOUNT: f64 = 5.0;

/// (mean, std-dev) of the normal amount distribution per category
fn amount_profile(category: &str) -> (f64, f64) {
    match category {
        "accommodation" => (150.0, 50.0),
        "transportation" => (80.0, 30.0),
        "food" => (45.0, 20.0),
        "entertainment" => (60.0, 25.0),
        "shopping" => (70.0, 35.0),
        _ => (40.0, 20.0), // other
    }
}

// ============================================================================
// EXPENSE ROW
// ============================================================================

/// One labeled training row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub category: String,
    pub amount: f64,
    pub trip_duration: u32,
    pub budget: u32,
    pub days_elapsed: u32,
    pub total_spent_so_far: f64,
}

// ============================================================================
// GENERATION
// ============================================================================

/// Generate `n` synthetic expense rows from a seeded RNG.
///
/// `total_spent_so_far` is the single sampled amount scaled by a random
/// 0.5x-2.0x factor, not an aggregate over prior rows. That simplification is
/// part of the dataset's definition and is kept as-is.
pub fn generate_sample_data(n: usize, seed: u64) -> Vec<ExpenseRow> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..n)
        .map(|_| {
            let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
            let (mean, std_dev) = amount_profile(category);
            let normal = Normal::new(mean, std_dev).expect("valid amount distribution");
            let amount = normal.sample(&mut rng).max(MIN_AMOUNT);

            let trip_duration: u32 = rng.gen_range(1..15);
            let budget: u32 = rng.gen_range(500..3000);
            let days_elapsed: u32 = rng.gen_range(1..=trip_duration);
            let total_spent_so_far = amount * rng.gen_range(0.5..2.0);

            ExpenseRow {
                category: category.to_string(),
                amount,
                trip_duration,
                budget,
                days_elapsed,
                total_spent_so_far,
            }
        })
        .collect()
}

// ============================================================================
// FEATURE ASSEMBLY
// ============================================================================

/// Feature vector for one row:
/// [category_code, trip_duration, budget, days_elapsed, total_spent_so_far]
pub fn feature_row(row: &ExpenseRow, encoder: &LabelEncoder) -> Result<Vec<f64>> {
    let code = encoder.transform(&row.category)?;
    Ok(vec![
        code as f64,
        row.trip_duration as f64,
        row.budget as f64,
        row.days_elapsed as f64,
        row.total_spent_so_far,
    ])
}

/// Build the feature matrix and target vector.
/// Target: remaining budget, `budget - total_spent_so_far`.
pub fn feature_matrix(
    rows: &[ExpenseRow],
    encoder: &LabelEncoder,
) -> Result<(Vec<Vec<f64>>, Vec<f64>)> {
    let mut x = Vec::with_capacity(rows.len());
    let mut y = Vec::with_capacity(rows.len());
    for row in rows {
        x.push(feature_row(row, encoder)?);
        y.push(row.budget as f64 - row.total_spent_so_far);
    }
    Ok((x, y))
}

/// Seeded shuffle split into (train, test) index sets.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_size = (n as f64 * test_fraction).round() as usize;
    let train = indices[test_size..].to_vec();
    let test = indices[..test_size].to_vec();
    (train, test)
}

// ============================================================================
// CSV EXPORT
// ============================================================================

/// Write the generated rows to CSV for inspection.
pub fn export_csv(rows: &[ExpenseRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create CSV file at {:?}", path))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().context("failed to flush CSV file")?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_rows_respect_ranges() {
        let rows = generate_sample_data(500, DEFAULT_SEED);

        assert_eq!(rows.len(), 500);
        for row in &rows {
            assert!(CATEGORIES.contains(&row.category.as_str()));
            assert!(row.amount >= MIN_AMOUNT);
            assert!((1..15).contains(&row.trip_duration));
            assert!((500..3000).contains(&row.budget));
            assert!(row.days_elapsed >= 1 && row.days_elapsed <= row.trip_duration);
            assert!(row.total_spent_so_far >= row.amount * 0.5);
            assert!(row.total_spent_so_far <= row.amount * 2.0);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_sample_data(100, DEFAULT_SEED);
        let b = generate_sample_data(100, DEFAULT_SEED);

        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_sample_data(100, 1);
        let b = generate_sample_data(100, 2);

        assert_ne!(a, b);
    }

    #[test]
    fn test_feature_matrix_layout() {
        let rows = generate_sample_data(10, DEFAULT_SEED);
        let encoder = LabelEncoder::fit(rows.iter().map(|r| r.category.as_str()));

        let (x, y) = feature_matrix(&rows, &encoder).unwrap();

        assert_eq!(x.len(), 10);
        assert_eq!(y.len(), 10);
        for (row, features) in rows.iter().zip(&x) {
            assert_eq!(features.len(), 5);
            assert_eq!(features[0], encoder.transform(&row.category).unwrap() as f64);
            assert_eq!(features[1], row.trip_duration as f64);
            assert_eq!(features[2], row.budget as f64);
            assert_eq!(features[3], row.days_elapsed as f64);
            assert_eq!(features[4], row.total_spent_so_far);
        }
        assert_eq!(y[0], rows[0].budget as f64 - rows[0].total_spent_so_far);
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let (train, test) = train_test_split(1000, 0.2, DEFAULT_SEED);

        assert_eq!(train.len(), 800);
        assert_eq!(test.len(), 200);

        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort();
        assert_eq!(all, (0..1000).collect::<Vec<usize>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = train_test_split(100, 0.2, 7);
        let b = train_test_split(100, 0.2, 7);

        assert_eq!(a, b);
    }

    #[test]
    fn test_export_csv_writes_file() {
        let rows = generate_sample_data(20, DEFAULT_SEED);
        let path = std::env::temp_dir().join("budget_prediction_test_export.csv");

        export_csv(&rows, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("category,amount,trip_duration,budget,days_elapsed,total_spent_so_far"));
        // header + 20 data lines
        assert_eq!(contents.lines().count(), 21);

        std::fs::remove_file(&path).ok();
    }
}
