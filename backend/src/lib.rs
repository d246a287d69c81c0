//! Farmer Performance Scoring & Tiering service
//!
//! Scores farmers from their operational history (QC results, deliveries,
//! certifications, repeat purchases), ranks them, and assigns tiers either
//! by fixed thresholds or by k-means segmentation.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod store;

pub use self::config::{Config, PerformanceSettings};
pub use error::{AppError, AppResult};
pub use store::{FarmerHistoryStore, InMemoryHistoryStore, PgHistoryStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState<S = PgHistoryStore> {
    pub store: S,
    pub settings: Arc<PerformanceSettings>,
}

impl<S: FarmerHistoryStore> AppState<S> {
    pub fn new(store: S, settings: PerformanceSettings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app<S: FarmerHistoryStore>(state: AppState<S>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes::<S>())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Farmer Performance Scoring API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
