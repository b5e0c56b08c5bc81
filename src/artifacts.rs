// 💾 Artifacts - Model persistence and serving capability
// The training job writes two JSON files (fitted forest + label encoder);
// the prediction service reads them once at startup. The files are replaced
// only by re-running training, never mutated in place.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::encoder::LabelEncoder;
use crate::forest::ForestRegressor;

// ============================================================================
// PATHS
// ============================================================================

/// Directory holding both artifacts, relative to the service's own directory
pub const ARTIFACT_DIR: &str = "model";

/// Serialized regression model
pub const MODEL_FILE: &str = "budget_model.json";

/// Serialized label encoder
pub const ENCODER_FILE: &str = "label_encoder.json";

pub fn model_path(dir: &Path) -> PathBuf {
    dir.join(MODEL_FILE)
}

pub fn encoder_path(dir: &Path) -> PathBuf {
    dir.join(ENCODER_FILE)
}

// ============================================================================
// MODEL ARTIFACT
// ============================================================================

/// The fitted forest plus training provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub trained_at: DateTime<Utc>,
    pub r2_score: f64,
    pub seed: u64,
    pub forest: ForestRegressor,
}

/// Persist both artifacts. Creates the directory if needed; overwrites
/// existing files.
pub fn save_artifacts(dir: &Path, model: &ModelArtifact, encoder: &LabelEncoder) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create artifact directory {:?}", dir))?;

    let model_json = serde_json::to_string(model).context("failed to serialize model")?;
    fs::write(model_path(dir), model_json)
        .with_context(|| format!("failed to write {:?}", model_path(dir)))?;

    let encoder_json =
        serde_json::to_string_pretty(encoder).context("failed to serialize encoder")?;
    fs::write(encoder_path(dir), encoder_json)
        .with_context(|| format!("failed to write {:?}", encoder_path(dir)))?;

    Ok(())
}

/// Load both artifacts or fail with context on the first problem.
pub fn load_artifacts(dir: &Path) -> Result<(ModelArtifact, LabelEncoder)> {
    let model_json = fs::read_to_string(model_path(dir))
        .with_context(|| format!("failed to read {:?}", model_path(dir)))?;
    let model: ModelArtifact =
        serde_json::from_str(&model_json).context("failed to parse model artifact")?;

    let encoder_json = fs::read_to_string(encoder_path(dir))
        .with_context(|| format!("failed to read {:?}", encoder_path(dir)))?;
    let encoder: LabelEncoder =
        serde_json::from_str(&encoder_json).context("failed to parse encoder artifact")?;

    Ok((model, encoder))
}

// ============================================================================
// PREDICTION CAPABILITY
// ============================================================================

/// What the service can do, resolved once at startup.
///
/// The request path matches on the variant; it never re-checks disk or any
/// ambient state. Immutable after construction, safe to share across
/// request handlers.
#[derive(Debug, Clone)]
pub enum PredictionCapability {
    /// Artifacts unavailable; arithmetic fallback only
    Heuristic,

    /// Artifacts loaded at startup
    Model {
        forest: ForestRegressor,
        encoder: LabelEncoder,
    },
}

impl PredictionCapability {
    /// Resolve the capability from the artifact directory. Any load failure
    /// degrades to `Heuristic`; never fatal.
    ///
    /// The accompanying report carries the loaded model's held-out R² or the
    /// load error, so callers only have to print it.
    pub fn load(dir: &Path) -> (Self, Result<f64>) {
        match load_artifacts(dir) {
            Ok((model, encoder)) => (
                PredictionCapability::Model {
                    forest: model.forest,
                    encoder,
                },
                Ok(model.r2_score),
            ),
            Err(e) => (PredictionCapability::Heuristic, Err(e)),
        }
    }

    pub fn has_model(&self) -> bool {
        matches!(self, PredictionCapability::Model { .. })
    }
}

// ============================================================================
// TESTS
// ============================================================================
