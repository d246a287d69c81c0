//! Scoring engine: metric aggregation, weighted score, trend, tiering, ranking

pub mod kmeans;
pub mod metrics;
pub mod ranking;
pub mod tier;
pub mod trend;
pub mod weights;

pub use kmeans::{Clustering, KMeans};
pub use metrics::aggregate_metrics;
pub use ranking::{apply_cluster_tiers, build_record, filter_records, rank_records};
pub use tier::{cluster_tiers, heuristic_tier, MIN_FARMERS_FOR_CLUSTERING};
pub use trend::classify_trend;
pub use weights::{calculate_score, WeightError, WeightSettings, WeightVector};
