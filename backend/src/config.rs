//! Configuration management for the Farmer Performance service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FPS_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{WeightSettings, WeightVector};

use crate::error::{AppError, AppResult};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Scoring engine configuration
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    /// Per-metric weights; must sum to 1.0
    #[serde(default)]
    pub weights: WeightSettings,

    /// Seed for k-means empty-cluster reseeding; fresh entropy when unset
    #[serde(default)]
    pub kmeans_seed: Option<u64>,

    /// Upper bound on farmers aggregated concurrently
    #[serde(default = "default_max_concurrent_aggregations")]
    pub max_concurrent_aggregations: usize,
}

fn default_max_concurrent_aggregations() -> usize {
    8
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: WeightSettings::default(),
            kmeans_seed: None,
            max_concurrent_aggregations: default_max_concurrent_aggregations(),
        }
    }
}

/// Validated, immutable engine settings shared by every request
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSettings {
    pub weights: WeightVector,
    pub kmeans_seed: Option<u64>,
    pub max_concurrent_aggregations: usize,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            weights: WeightVector::default(),
            kmeans_seed: None,
            max_concurrent_aggregations: default_max_concurrent_aggregations(),
        }
    }
}

impl ScoringConfig {
    /// Check configuration invariants once, at startup
    pub fn validate(&self) -> AppResult<PerformanceSettings> {
        let weights = WeightVector::try_from(self.weights)
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        if self.max_concurrent_aggregations == 0 {
            return Err(AppError::Configuration(
                "scoring.max_concurrent_aggregations must be at least 1".to_string(),
            ));
        }

        Ok(PerformanceSettings {
            weights,
            kmeans_seed: self.kmeans_seed,
            max_concurrent_aggregations: self.max_concurrent_aggregations,
        })
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FPS_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let weights = WeightSettings::default();

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("scoring.weights.quality_consistency", weights.quality_consistency)?
            .set_default("scoring.weights.delivery_reliability", weights.delivery_reliability)?
            .set_default("scoring.weights.volume_fulfillment", weights.volume_fulfillment)?
            .set_default("scoring.weights.sustainability", weights.sustainability)?
            .set_default("scoring.weights.customer_feedback", weights.customer_feedback)?
            .set_default(
                "scoring.max_concurrent_aggregations",
                default_max_concurrent_aggregations() as u64,
            )?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FPS_ prefix)
            .add_source(
                Environment::with_prefix("FPS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
