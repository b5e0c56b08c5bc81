// Budget Prediction Service - Core Library
// Exposes all modules for use in the training CLI, API server, and tests

pub mod artifacts;
pub mod encoder;
pub mod forest;
pub mod predictor;
pub mod synthetic;
pub mod training;

// Re-export commonly used types
pub use artifacts::{
    encoder_path, load_artifacts, model_path, save_artifacts,
    ModelArtifact, PredictionCapability,
    ARTIFACT_DIR, ENCODER_FILE, MODEL_FILE,
};
pub use encoder::LabelEncoder;
pub use forest::{DecisionTree, ForestParams, ForestRegressor};
pub use predictor::{
    days_elapsed, predict, predict_from_body,
    BudgetStatus, ExpenseRecord, PredictionRequest, PredictionResponse,
};
pub use synthetic::{
    export_csv, feature_matrix, feature_row, generate_sample_data, train_test_split,
    ExpenseRow, CATEGORIES, DEFAULT_SEED, SAMPLE_SIZE,
};
pub use training::{train_forest, TEST_FRACTION};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
