//! Reduction of a farmer's raw operational history into normalized sub-metrics

use chrono::Datelike;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::{percent, FarmerHistory, FarmerMetrics, MetricBreakdown, QcResult};

/// Delivery reliability applied to farmers with no delivery history
pub const NEUTRAL_RELIABILITY: f64 = 0.5;

/// Volume fulfillment when deliveries exist but nothing was expected
pub const NEUTRAL_VOLUME: f64 = 0.5;

/// Sustainability ratio for farmers without a valid certification
pub const UNCERTIFIED_SUSTAINABILITY: f64 = 0.4;

/// Customer feedback floor before repeat purchases are counted
pub const FEEDBACK_BASE: f64 = 0.4;

/// Aggregate a farmer's history into the five sub-metrics and diagnostics
pub fn aggregate_metrics(history: &FarmerHistory) -> FarmerMetrics {
    let acceptance_rates = acceptance_rates(&history.qc_results);

    let total_accepted: Decimal = history
        .qc_results
        .iter()
        .map(|qc| qc.accepted_quantity)
        .sum();
    let total_expected: Decimal = history
        .qc_results
        .iter()
        .map(|qc| qc.expected_quantity)
        .sum();
    let total_rejected: Decimal = history
        .qc_results
        .iter()
        .map(|qc| qc.rejected_quantity)
        .sum();

    let breakdown = MetricBreakdown::clamped(
        quality_consistency(&acceptance_rates),
        delivery_reliability(history),
        volume_fulfillment(total_accepted, total_expected, history.deliveries.len()),
        sustainability(history.valid_certifications),
        customer_feedback(&history.customer_purchase_counts),
    );

    let rejection_rate = ratio_or_zero(total_rejected, total_expected);
    let weekly_volume = weekly_volume(&history.qc_results, total_accepted);

    let total_accepted = total_accepted.to_f64().unwrap_or(0.0);
    let capacity = if acceptance_rates.is_empty() {
        total_accepted
    } else {
        total_accepted / acceptance_rates.len() as f64
    };

    FarmerMetrics {
        breakdown,
        capacity,
        quality_variance: population_variance(&acceptance_rates),
        rejection_rate,
        weekly_volume,
        acceptance_rates,
    }
}

/// Per-delivery acceptance rates in chronological order.
///
/// QC lines are summed per delivery; deliveries are ordered by their earliest
/// QC timestamp. A delivery with zero expected quantity yields no sample.
pub fn acceptance_rates(qc_results: &[QcResult]) -> Vec<f64> {
    let mut ordered: Vec<&QcResult> = qc_results.iter().collect();
    ordered.sort_by_key(|qc| qc.recorded_at);

    let mut totals: Vec<(Decimal, Decimal)> = Vec::new();
    let mut slots: HashMap<Uuid, usize> = HashMap::new();
    for qc in ordered {
        let slot = *slots.entry(qc.delivery_id).or_insert_with(|| {
            totals.push((Decimal::ZERO, Decimal::ZERO));
            totals.len() - 1
        });
        totals[slot].0 += qc.expected_quantity;
        totals[slot].1 += qc.accepted_quantity;
    }

    totals
        .into_iter()
        .filter(|(expected, _)| *expected > Decimal::ZERO)
        .filter_map(|(expected, accepted)| accepted.checked_div(expected)?.to_f64())
        .collect()
}

/// Mean acceptance rate as a percentage; 0 without samples
pub fn quality_consistency(rates: &[f64]) -> f64 {
    if rates.is_empty() {
        return 0.0;
    }
    percent(mean(rates))
}

/// Share of deliveries marked delivered; neutral 50% for farmers with none
pub fn delivery_reliability(history: &FarmerHistory) -> f64 {
    let total = history.deliveries.len();
    if total == 0 {
        return percent(NEUTRAL_RELIABILITY);
    }
    let delivered = history.deliveries.iter().filter(|d| d.is_delivered()).count();
    percent(delivered as f64 / total as f64)
}

/// Accepted over expected quantity across all QC results
pub fn volume_fulfillment(accepted: Decimal, expected: Decimal, delivery_count: usize) -> f64 {
    if expected > Decimal::ZERO {
        let ratio = accepted
            .checked_div(expected)
            .and_then(|r| r.to_f64())
            .unwrap_or(0.0);
        return percent(ratio);
    }
    if delivery_count > 0 {
        percent(NEUTRAL_VOLUME)
    } else {
        0.0
    }
}

/// Certification-based sustainability score
pub fn sustainability(valid_certifications: u32) -> f64 {
    if valid_certifications == 0 {
        return percent(UNCERTIFIED_SUSTAINABILITY);
    }
    percent((0.8 + 0.05 * valid_certifications as f64).min(1.0))
}

/// Repeat-purchase based customer feedback score
pub fn customer_feedback(purchase_counts: &[u32]) -> f64 {
    let repeat_rate = if purchase_counts.is_empty() {
        0.0
    } else {
        let repeat = purchase_counts.iter().filter(|&&count| count >= 2).count();
        repeat as f64 / purchase_counts.len() as f64
    };
    percent(FEEDBACK_BASE + (1.0 - FEEDBACK_BASE) * repeat_rate)
}

/// Accepted quantity averaged over the ISO weeks that saw any QC activity
pub fn weekly_volume(qc_results: &[QcResult], total_accepted: Decimal) -> f64 {
    let weeks: HashSet<_> = qc_results.iter().map(|qc| qc.recorded_at.iso_week()).collect();
    ratio_or_zero(total_accepted, Decimal::from(weeks.len()))
}

fn ratio_or_zero(numerator: Decimal, denominator: Decimal) -> f64 {
    if denominator <= Decimal::ZERO {
        return 0.0;
    }
    numerator
        .checked_div(denominator)
        .and_then(|r| r.to_f64())
        .unwrap_or(0.0)
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}
