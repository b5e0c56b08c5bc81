// Budget Prediction Service - Training Job
// Generates seeded synthetic expense data, fits the label encoder and the
// forest regressor, and persists both artifacts for the prediction service.

use anyhow::Result;
use chrono::Utc;
use std::env;
use std::path::Path;

use budget_prediction::{
    encoder_path, feature_matrix, generate_sample_data, model_path, save_artifacts, train_forest,
    ForestParams, LabelEncoder, ModelArtifact, ARTIFACT_DIR, DEFAULT_SEED, SAMPLE_SIZE,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "export-data" {
        // Dataset export mode
        let path = args
            .get(2)
            .map(String::as_str)
            .unwrap_or("sample_expenses.csv");
        run_export(Path::new(path))?;
    } else {
        // Training mode (default)
        run_train()?;
    }

    Ok(())
}

fn run_train() -> Result<()> {
    println!("🧮 Budget Prediction - Training Job");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Generate synthetic dataset
    println!("\n🎲 Generating sample data...");
    let rows = generate_sample_data(SAMPLE_SIZE, DEFAULT_SEED);
    println!("✓ Generated {} expense rows (seed {})", rows.len(), DEFAULT_SEED);

    // 2. Fit the label encoder
    let encoder = LabelEncoder::fit(rows.iter().map(|r| r.category.as_str()));
    println!("✓ Encoded {} categories: {:?}", encoder.len(), encoder.classes());

    // 3. Assemble features and target (remaining budget)
    let (x, y) = feature_matrix(&rows, &encoder)?;

    // 4. Train and evaluate on the held-out split
    let params = ForestParams::default();
    println!("\n🌲 Training model ({} trees)...", params.n_trees);
    let (forest, score) = train_forest(&x, &y, params, DEFAULT_SEED)?;
    println!("✓ Model R² score: {score:.3}");

    // 5. Persist artifacts (always, regardless of score)
    println!("\n💾 Saving artifacts...");
    let artifact = ModelArtifact {
        trained_at: Utc::now(),
        r2_score: score,
        seed: DEFAULT_SEED,
        forest,
    };
    let dir = Path::new(ARTIFACT_DIR);
    save_artifacts(dir, &artifact, &encoder)?;
    println!("✓ Model saved to {:?}", model_path(dir));
    println!("✓ Label encoder saved to {:?}", encoder_path(dir));

    Ok(())
}

fn run_export(path: &Path) -> Result<()> {
    println!("🎲 Budget Prediction - Dataset Export");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let rows = generate_sample_data(SAMPLE_SIZE, DEFAULT_SEED);
    budget_prediction::export_csv(&rows, path)?;

    println!("✓ Wrote {} rows to {:?}", rows.len(), path);

    Ok(())
}
