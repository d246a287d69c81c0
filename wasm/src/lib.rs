//! WebAssembly module for the Farmer Performance engine
//!
//! Provides client-side computation for:
//! - Weighted performance scores
//! - Threshold tier classification
//! - Acceptance-rate trend classification
//! - Certification-based sustainability scores

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::scoring::{self, metrics, WeightVector};

/// Calculate the 0-100 performance score from a metric breakdown, using default weights
#[wasm_bindgen]
pub fn calculate_performance_score(breakdown_json: &str) -> Result<u8, JsValue> {
    let breakdown: MetricBreakdown = serde_json::from_str(breakdown_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid breakdown JSON: {}", e)))?;

    Ok(scoring::calculate_score(&breakdown, &WeightVector::default()))
}

/// Classify a performance score into its threshold tier
#[wasm_bindgen]
pub fn classify_tier(score: u8) -> String {
    scoring::heuristic_tier(score).to_string()
}

/// Classify the trend of chronologically ordered acceptance rates
#[wasm_bindgen]
pub fn classify_trend(rates_json: &str) -> Result<String, JsValue> {
    let rates: Vec<f64> = serde_json::from_str(rates_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid rates JSON: {}", e)))?;

    Ok(scoring::classify_trend(&rates).to_string())
}

/// Sustainability percentage for a number of valid certifications
#[wasm_bindgen]
pub fn sustainability_percent(valid_cert_count: u32) -> f64 {
    metrics::sustainability(valid_cert_count)
}
