//! Record construction, dense ranking, and list filtering

use rand::Rng;

use crate::models::{FarmerId, FarmerMetrics, FarmerPerformanceRecord, Tier};
use crate::scoring::tier::{cluster_tiers, heuristic_tier};
use crate::scoring::trend::classify_trend;
use crate::scoring::weights::{calculate_score, WeightVector};

/// Score, threshold-tier, and trend one farmer's metrics (unranked)
pub fn build_record(
    farmer_id: FarmerId,
    metrics: &FarmerMetrics,
    weights: &WeightVector,
) -> FarmerPerformanceRecord {
    let performance_score = calculate_score(&metrics.breakdown, weights);
    FarmerPerformanceRecord {
        farmer_id,
        performance_score,
        tier: heuristic_tier(performance_score),
        metric_breakdown: metrics.breakdown,
        rank: None,
        trend: classify_trend(&metrics.acceptance_rates),
    }
}

/// Sort by score descending and assign ranks 1..N.
///
/// The sort is stable, so equal scores keep their enumeration order.
pub fn rank_records(records: &mut [FarmerPerformanceRecord]) {
    records.sort_by(|a, b| b.performance_score.cmp(&a.performance_score));
    for (index, record) in records.iter_mut().enumerate() {
        record.rank = Some(index as u32 + 1);
    }
}

/// Overwrite tiers with clustering results.
///
/// Clusters the records in their current order. Returns `false` and leaves
/// threshold tiers in place when the population is too small to cluster.
pub fn apply_cluster_tiers<R: Rng + ?Sized>(
    records: &mut [FarmerPerformanceRecord],
    rng: &mut R,
) -> bool {
    let breakdowns: Vec<_> = records.iter().map(|r| r.metric_breakdown).collect();
    let scores: Vec<u8> = records.iter().map(|r| r.performance_score).collect();

    match cluster_tiers(&breakdowns, &scores, rng) {
        Some(tiers) => {
            for (record, tier) in records.iter_mut().zip(tiers) {
                record.tier = tier;
            }
            true
        }
        None => false,
    }
}

/// Keep records in the requested tier, then truncate to `top_n`
pub fn filter_records(
    records: Vec<FarmerPerformanceRecord>,
    tier_filter: Option<Tier>,
    top_n: Option<usize>,
) -> Vec<FarmerPerformanceRecord> {
    let filtered = records
        .into_iter()
        .filter(|record| tier_filter.map_or(true, |tier| record.tier == tier));

    match top_n {
        Some(limit) => filtered.take(limit).collect(),
        None => filtered.collect(),
    }
}
