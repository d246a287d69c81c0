//! Route definitions for the Farmer Performance service

use axum::{routing::get, Router};

use crate::{handlers, store::FarmerHistoryStore, AppState};

/// Create API routes
pub fn api_routes<S: FarmerHistoryStore>() -> Router<AppState<S>> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check::<S>))
        // Farmer performance
        .nest("/farmers", farmer_routes::<S>())
}

/// Farmer performance routes
fn farmer_routes<S: FarmerHistoryStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/performance", get(handlers::get_performance::<S>))
        .route("/:farmer_id/metrics", get(handlers::get_farmer_metrics::<S>))
}
