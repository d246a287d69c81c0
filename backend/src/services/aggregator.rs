//! Metric aggregation: collaborator reads reduced to normalized sub-metrics

use chrono::NaiveDate;
use shared::{aggregate_metrics, FarmerHistory, FarmerId, FarmerMetrics};

use crate::error::AppResult;
use crate::store::FarmerHistoryStore;

/// Pulls one farmer's history from the store and aggregates it
#[derive(Clone)]
pub struct MetricAggregator<S> {
    store: S,
}

impl<S: FarmerHistoryStore> MetricAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read everything the engine needs for one farmer, concurrently
    pub async fn load_history(
        &self,
        farmer_id: FarmerId,
        as_of: NaiveDate,
    ) -> AppResult<FarmerHistory> {
        let (qc_results, deliveries, valid_certifications, customer_purchase_counts) =
            tokio::try_join!(
                self.store.qc_results_for_farmer(farmer_id),
                self.store.deliveries_for_farmer(farmer_id),
                self.store.valid_certification_count(farmer_id, as_of),
                self.store.customer_purchase_counts(farmer_id),
            )?;

        Ok(FarmerHistory {
            qc_results,
            deliveries,
            valid_certifications,
            customer_purchase_counts,
        })
    }

    /// Aggregate a farmer's history as of the given date
    pub async fn aggregate(
        &self,
        farmer_id: FarmerId,
        as_of: NaiveDate,
    ) -> AppResult<FarmerMetrics> {
        let history = self.load_history(farmer_id, as_of).await?;
        let metrics = aggregate_metrics(&history);

        tracing::debug!(
            %farmer_id,
            deliveries = history.deliveries.len(),
            rate_samples = metrics.acceptance_rates.len(),
            capacity = metrics.capacity,
            quality_variance = metrics.quality_variance,
            rejection_rate = metrics.rejection_rate,
            "Aggregated farmer metrics"
        );

        Ok(metrics)
    }
}
