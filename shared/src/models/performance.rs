//! Farmer performance models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::history::FarmerId;

/// Five normalized sub-metrics, each a percentage in [0, 100]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct MetricBreakdown {
    pub quality_consistency: f64,
    pub delivery_reliability: f64,
    pub volume_fulfillment: f64,
    pub sustainability: f64,
    pub customer_feedback: f64,
}

impl MetricBreakdown {
    /// Number of sub-metrics, i.e. the clustering feature dimension
    pub const DIMENSIONS: usize = 5;

    /// Build a breakdown, clamping every value into [0, 100] and mapping NaN to 0
    pub fn clamped(
        quality_consistency: f64,
        delivery_reliability: f64,
        volume_fulfillment: f64,
        sustainability: f64,
        customer_feedback: f64,
    ) -> Self {
        Self {
            quality_consistency: clamp_percent(quality_consistency),
            delivery_reliability: clamp_percent(delivery_reliability),
            volume_fulfillment: clamp_percent(volume_fulfillment),
            sustainability: clamp_percent(sustainability),
            customer_feedback: clamp_percent(customer_feedback),
        }
    }

    /// Feature vector in fixed metric order
    pub fn as_array(&self) -> [f64; Self::DIMENSIONS] {
        [
            self.quality_consistency,
            self.delivery_reliability,
            self.volume_fulfillment,
            self.sustainability,
            self.customer_feedback,
        ]
    }
}

/// Clamp a percentage into [0, 100]; non-finite values become 0
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Convert a ratio to a whole percentage in [0, 100]
pub fn percent(ratio: f64) -> f64 {
    clamp_percent((ratio * 100.0).round())
}

/// Performance tier, ordered best to worst
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    #[serde(rename = "Tier 1")]
    Tier1,
    #[serde(rename = "Tier 2")]
    Tier2,
    #[serde(rename = "Tier 3")]
    Tier3,
    #[serde(rename = "Tier 4")]
    Tier4,
}

impl Tier {
    /// All tiers, best first
    pub const ALL: [Tier; 4] = [Tier::Tier1, Tier::Tier2, Tier::Tier3, Tier::Tier4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Tier1 => "Tier 1",
            Tier::Tier2 => "Tier 2",
            Tier::Tier3 => "Tier 3",
            Tier::Tier4 => "Tier 4",
        }
    }

    /// Tier at the given position in best-to-worst order
    pub fn from_index(index: usize) -> Option<Tier> {
        Self::ALL.get(index).copied()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = &'static str;

    /// Exact, case-insensitive match against "Tier 1".."Tier 4"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .iter()
            .copied()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s))
            .ok_or("Unknown tier, expected one of Tier 1, Tier 2, Tier 3, Tier 4")
    }
}

/// Short-term acceptance-rate trajectory
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Improving => write!(f, "improving"),
            Trend::Stable => write!(f, "stable"),
            Trend::Declining => write!(f, "declining"),
        }
    }
}

/// Tier assignment policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Segmentation {
    /// Fixed score thresholds
    #[default]
    Heuristic,
    /// Relative clustering across the whole farmer population
    Kmeans,
}

impl FromStr for Segmentation {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("heuristic") {
            Ok(Segmentation::Heuristic)
        } else if s.eq_ignore_ascii_case("kmeans") {
            Ok(Segmentation::Kmeans)
        } else {
            Err("Segmentation must be either heuristic or kmeans")
        }
    }
}

/// Aggregated metrics for one farmer, plus diagnostics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmerMetrics {
    pub breakdown: MetricBreakdown,
    /// Mean accepted quantity per delivery
    pub capacity: f64,
    /// Population variance of per-delivery acceptance rates
    pub quality_variance: f64,
    /// Rejected over expected quantity across all QC results; 0 when nothing was expected
    pub rejection_rate: f64,
    /// Mean accepted quantity per ISO week with at least one QC result
    pub weekly_volume: f64,
    /// Per-delivery acceptance rates, oldest first
    pub acceptance_rates: Vec<f64>,
}

/// Computed performance for one farmer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmerPerformanceRecord {
    pub farmer_id: FarmerId,
    pub performance_score: u8,
    pub tier: Tier,
    pub metric_breakdown: MetricBreakdown,
    /// Dense 1..N rank, only present when ranked against other farmers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    pub trend: Trend,
}
