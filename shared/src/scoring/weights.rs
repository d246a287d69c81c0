//! Weighted combination of sub-metrics into a single performance score

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::MetricBreakdown;

/// Allowed deviation of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weight configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("weight for {metric} must be a finite, non-negative number (got {value})")]
    InvalidWeight { metric: &'static str, value: f64 },

    #[error("weights must sum to 1.0 (got {0})")]
    NotNormalized(f64),
}

/// Immutable per-metric weights that sum to 1.0.
///
/// Only constructible through [`WeightVector::new`], so a value of this type
/// always satisfies the normalization invariant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightVector {
    quality_consistency: f64,
    delivery_reliability: f64,
    volume_fulfillment: f64,
    sustainability: f64,
    customer_feedback: f64,
}

impl WeightVector {
    pub fn new(
        quality_consistency: f64,
        delivery_reliability: f64,
        volume_fulfillment: f64,
        sustainability: f64,
        customer_feedback: f64,
    ) -> Result<Self, WeightError> {
        let named = [
            ("quality_consistency", quality_consistency),
            ("delivery_reliability", delivery_reliability),
            ("volume_fulfillment", volume_fulfillment),
            ("sustainability", sustainability),
            ("customer_feedback", customer_feedback),
        ];
        for (metric, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightError::InvalidWeight { metric, value });
            }
        }

        let sum: f64 = named.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightError::NotNormalized(sum));
        }

        Ok(Self {
            quality_consistency,
            delivery_reliability,
            volume_fulfillment,
            sustainability,
            customer_feedback,
        })
    }

    /// Weights in the same order as [`MetricBreakdown::as_array`]
    pub fn as_array(&self) -> [f64; MetricBreakdown::DIMENSIONS] {
        [
            self.quality_consistency,
            self.delivery_reliability,
            self.volume_fulfillment,
            self.sustainability,
            self.customer_feedback,
        ]
    }

    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }
}

impl Default for WeightVector {
    /// 30/20/15/15/20 split used in production
    fn default() -> Self {
        Self {
            quality_consistency: 0.30,
            delivery_reliability: 0.20,
            volume_fulfillment: 0.15,
            sustainability: 0.15,
            customer_feedback: 0.20,
        }
    }
}

/// Raw configuration shape, validated into a [`WeightVector`]
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct WeightSettings {
    pub quality_consistency: f64,
    pub delivery_reliability: f64,
    pub volume_fulfillment: f64,
    pub sustainability: f64,
    pub customer_feedback: f64,
}

impl Default for WeightSettings {
    fn default() -> Self {
        let [
            quality_consistency,
            delivery_reliability,
            volume_fulfillment,
            sustainability,
            customer_feedback,
        ] = WeightVector::default().as_array();
        Self {
            quality_consistency,
            delivery_reliability,
            volume_fulfillment,
            sustainability,
            customer_feedback,
        }
    }
}

impl TryFrom<WeightSettings> for WeightVector {
    type Error = WeightError;

    fn try_from(settings: WeightSettings) -> Result<Self, Self::Error> {
        WeightVector::new(
            settings.quality_consistency,
            settings.delivery_reliability,
            settings.volume_fulfillment,
            settings.sustainability,
            settings.customer_feedback,
        )
    }
}

/// Weighted performance score, rounded and clamped to [0, 100]
pub fn calculate_score(breakdown: &MetricBreakdown, weights: &WeightVector) -> u8 {
    let weighted: f64 = breakdown
        .as_array()
        .iter()
        .zip(weights.as_array())
        .map(|(value, weight)| value * weight)
        .sum();

    if !weighted.is_finite() {
        return 0;
    }
    weighted.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_are_normalized() {
        let weights = WeightVector::default();
        assert!((weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        assert_eq!(WeightVector::try_from(WeightSettings::default()), Ok(weights));
    }

    #[test]
    fn test_rejects_unnormalized_weights() {
        let result = WeightVector::new(0.3, 0.3, 0.15, 0.15, 0.2);
        assert!(matches!(result, Err(WeightError::NotNormalized(_))));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let result = WeightVector::new(1.2, -0.2, 0.0, 0.0, 0.0);
        assert_eq!(
            result,
            Err(WeightError::InvalidWeight {
                metric: "delivery_reliability",
                value: -0.2
            })
        );
    }

    #[test]
    fn test_score_uses_weights() {
        let breakdown = MetricBreakdown::clamped(100.0, 50.0, 0.0, 40.0, 40.0);
        // 30 + 10 + 0 + 6 + 8
        assert_eq!(calculate_score(&breakdown, &WeightVector::default()), 54);
    }

    #[test]
    fn test_alternate_weighting() {
        let quality_only = WeightVector::new(1.0, 0.0, 0.0, 0.0, 0.0).unwrap();
        let breakdown = MetricBreakdown::clamped(73.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(calculate_score(&breakdown, &quality_only), 73);
    }

    #[test]
    fn test_perfect_breakdown_scores_100() {
        let breakdown = MetricBreakdown::clamped(100.0, 100.0, 100.0, 100.0, 100.0);
        assert_eq!(calculate_score(&breakdown, &WeightVector::default()), 100);
    }
}
