//! Business logic services for the Farmer Performance service

pub mod aggregator;
pub mod export;
pub mod ranking;

pub use aggregator::MetricAggregator;
pub use ranking::RankingService;
