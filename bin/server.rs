// Budget Prediction Service - Web Server
// REST API with Axum: POST /predict + GET /health on a fixed port.
// Loads the trained artifacts once at startup; any load failure degrades to
// the heuristic-only capability and the service stays up.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use budget_prediction::{predict_from_body, PredictionCapability, ARTIFACT_DIR};

/// Shared application state: the capability resolved at startup, read-only
/// for the lifetime of the process.
#[derive(Clone)]
struct AppState {
    capability: Arc<PredictionCapability>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health - fixed availability acknowledgment, independent of whether
/// the model loaded
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ML service is running",
    })
}

/// POST /predict - compute a prediction from the request payload
///
/// Takes the raw body so that every malformed request, including
/// syntactically invalid JSON, becomes this service's own JSON error payload
/// rather than a framework rejection.
async fn predict_handler(State(state): State<AppState>, body: String) -> impl IntoResponse {
    match predict_from_body(&body, &state.capability) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            eprintln!("Error handling /predict: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("{e:#}"),
                }),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Budget Prediction Service - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Resolve the serving capability once; never fatal
    let (capability, report) = PredictionCapability::load(Path::new(ARTIFACT_DIR));
    match report {
        Ok(score) => {
            println!("✓ Model and encoder loaded successfully (held-out R² {score:.3})");
        }
        Err(e) => {
            eprintln!("⚠️  Model files not found. Please train the model first.");
            eprintln!("   Run: cargo run --bin budget-train");
            eprintln!("   ({e:#})");
        }
    }

    let state = AppState {
        capability: Arc::new(capability),
    };

    // Build router
    let app = Router::new()
        .route("/predict", post(predict_handler))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:5001";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:5001");
    println!("   Predict: POST http://localhost:5001/predict");
    println!("   Health:  GET  http://localhost:5001/health");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
