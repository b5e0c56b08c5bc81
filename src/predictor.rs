// 📈 Predictor - Request/response types and the prediction rules
// Stateless: each request is computed from its own payload plus the
// immutable capability resolved at startup. Budget status derives purely
// from comparing the prediction against the budget and 0.7x the budget.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::artifacts::PredictionCapability;

// ============================================================================
// REQUEST / RESPONSE
// ============================================================================

/// One logged expense, as it arrives in the request payload. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub amount: f64,

    /// ISO-8601 date or datetime string; only the YYYY-MM-DD prefix matters
    pub date: String,

    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "other".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,

    #[serde(default = "default_budget")]
    pub budget: f64,

    #[serde(default = "default_trip_duration")]
    pub trip_duration: u32,
}

fn default_budget() -> f64 {
    1000.0
}

fn default_trip_duration() -> u32 {
    7
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_spending: f64,
    pub budget_status: BudgetStatus,
    pub recommendations: Vec<String>,
}

// ============================================================================
// BUDGET STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    OverBudget,
    UnderBudget,
}

impl BudgetStatus {
    /// Strict comparisons on both boundaries: a prediction exactly at the
    /// budget, or exactly at 0.7x the budget, is on track.
    pub fn classify(predicted: f64, budget: f64) -> Self {
        if predicted > budget {
            BudgetStatus::OverBudget
        } else if predicted < budget * 0.7 {
            BudgetStatus::UnderBudget
        } else {
            BudgetStatus::OnTrack
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::OnTrack => "on_track",
            BudgetStatus::OverBudget => "over_budget",
            BudgetStatus::UnderBudget => "under_budget",
        }
    }
}

// ============================================================================
// PREDICTION
// ============================================================================

/// First 10 characters of the date string (the YYYY-MM-DD part), char-safe.
fn date_prefix(date: &str) -> &str {
    match date.char_indices().nth(10) {
        Some((i, _)) => &date[..i],
        None => date,
    }
}

/// Count of distinct calendar dates across the expenses.
/// Three expenses on one day still count as a single elapsed day.
pub fn days_elapsed(expenses: &[ExpenseRecord]) -> usize {
    expenses
        .iter()
        .map(|e| date_prefix(&e.date))
        .collect::<HashSet<_>>()
        .len()
}

/// Produce the prediction for one request.
pub fn predict(request: &PredictionRequest, capability: &PredictionCapability) -> PredictionResponse {
    if request.expenses.is_empty() {
        return PredictionResponse {
            predicted_spending: request.budget * 0.8,
            budget_status: BudgetStatus::OnTrack,
            recommendations: vec!["Start tracking expenses for better predictions".to_string()],
        };
    }

    let total_spent: f64 = request.expenses.iter().map(|e| e.amount).sum();
    let days = days_elapsed(&request.expenses);

    match capability {
        PredictionCapability::Heuristic => {
            let daily_average = total_spent / days.max(1) as f64;
            let predicted_total = daily_average * request.trip_duration as f64;
            let status = BudgetStatus::classify(predicted_total, request.budget);

            let advice = if status == BudgetStatus::OverBudget {
                "Consider setting daily spending limits"
            } else {
                "You're doing great with your budget!"
            };

            PredictionResponse {
                predicted_spending: predicted_total,
                budget_status: status,
                recommendations: vec![
                    format!(
                        "Based on current spending, you might spend ${predicted_total:.2} total"
                    ),
                    format!("Your daily average is ${daily_average:.2}"),
                    advice.to_string(),
                ],
            }
        }
        // The loaded forest is not consulted here; the served estimate is a
        // flat 1.2x multiplier over observed spending.
        PredictionCapability::Model { .. } => PredictionResponse {
            predicted_spending: total_spent * 1.2,
            budget_status: BudgetStatus::OnTrack,
            recommendations: vec!["Keep tracking your expenses!".to_string()],
        },
    }
}

/// Parse a raw JSON request body and produce the prediction.
///
/// Parsing happens here rather than in the HTTP extractor so every malformed
/// body (invalid JSON, missing fields, wrong types) surfaces as the
/// service's own error payload instead of a framework rejection.
pub fn predict_from_body(
    body: &str,
    capability: &PredictionCapability,
) -> Result<PredictionResponse> {
    let request: PredictionRequest =
        serde_json::from_str(body).context("invalid prediction request body")?;
    Ok(predict(&request, capability))
}

// ============================================================================
// TESTS
// ============================================================================
