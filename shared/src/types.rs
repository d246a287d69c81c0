//! Request and response types for the performance query surface

use serde::{Deserialize, Serialize};

use crate::models::{FarmerId, FarmerMetrics, FarmerPerformanceRecord, Segmentation, Tier, Trend};
use crate::scoring::classify_trend;

/// Raw query parameters as received from the transport layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceQuery {
    pub farmer_id: Option<String>,
    pub tier_filter: Option<String>,
    pub top_n: Option<String>,
    pub segmentation: Option<String>,
    pub format: Option<String>,
}

/// Output encoding for list responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// Validated performance request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PerformanceRequest {
    pub farmer_id: Option<FarmerId>,
    pub tier_filter: Option<Tier>,
    pub top_n: Option<usize>,
    pub segmentation: Segmentation,
    pub format: ExportFormat,
}

/// List-mode response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceList {
    pub results: Vec<FarmerPerformanceRecord>,
}

/// Response for either query mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PerformanceResponse {
    Single(FarmerPerformanceRecord),
    List(PerformanceList),
}

/// Diagnostics view of one farmer's aggregated metrics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmerMetricsReport {
    pub farmer_id: FarmerId,
    #[serde(flatten)]
    pub metrics: FarmerMetrics,
    pub trend: Trend,
}

impl FarmerMetricsReport {
    pub fn new(farmer_id: FarmerId, metrics: FarmerMetrics) -> Self {
        let trend = classify_trend(&metrics.acceptance_rates);
        Self {
            farmer_id,
            metrics,
            trend,
        }
    }
}

/// Flattened record for tabular export
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PerformanceExportRow {
    pub rank: Option<u32>,
    pub farmer_id: FarmerId,
    pub performance_score: u8,
    pub tier: Tier,
    pub trend: String,
    pub quality_consistency: f64,
    pub delivery_reliability: f64,
    pub volume_fulfillment: f64,
    pub sustainability: f64,
    pub customer_feedback: f64,
}

impl From<&FarmerPerformanceRecord> for PerformanceExportRow {
    fn from(record: &FarmerPerformanceRecord) -> Self {
        let breakdown = &record.metric_breakdown;
        Self {
            rank: record.rank,
            farmer_id: record.farmer_id,
            performance_score: record.performance_score,
            tier: record.tier,
            trend: record.trend.to_string(),
            quality_consistency: breakdown.quality_consistency,
            delivery_reliability: breakdown.delivery_reliability,
            volume_fulfillment: breakdown.volume_fulfillment,
            sustainability: breakdown.sustainability,
            customer_feedback: breakdown.customer_feedback,
        }
    }
}
