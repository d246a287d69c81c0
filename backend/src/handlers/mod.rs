//! HTTP handlers for the Farmer Performance service

pub mod health;
pub mod performance;

pub use health::health_check;
pub use performance::{get_farmer_metrics, get_performance};
