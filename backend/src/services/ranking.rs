//! Ranking service: per-farmer pipelines, dense ranking, segmentation, filtering
//!
//! Every call recomputes from the store's current data. Per-farmer
//! aggregation fans out concurrently; clustering waits until every farmer's
//! metrics are in. Dropping a request future aborts its in-flight reads.

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{
    apply_cluster_tiers, build_record, filter_records, rank_records, FarmerId, FarmerMetrics,
    FarmerMetricsReport, FarmerPerformanceRecord, PerformanceList, PerformanceRequest,
    PerformanceResponse, Segmentation, Tier,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::PerformanceSettings;
use crate::error::{AppError, AppResult};
use crate::services::aggregator::MetricAggregator;
use crate::store::FarmerHistoryStore;

/// Orchestrates scoring across one or many farmers
#[derive(Clone)]
pub struct RankingService<S> {
    aggregator: MetricAggregator<S>,
    settings: Arc<PerformanceSettings>,
}

impl<S: FarmerHistoryStore> RankingService<S> {
    pub fn new(store: S, settings: Arc<PerformanceSettings>) -> Self {
        Self {
            aggregator: MetricAggregator::new(store),
            settings,
        }
    }

    /// Answer a validated request in single-farmer or list mode
    pub async fn performance(
        &self,
        request: &PerformanceRequest,
    ) -> AppResult<PerformanceResponse> {
        match request.farmer_id {
            Some(farmer_id) => {
                let record = self
                    .farmer_performance(farmer_id, request.segmentation)
                    .await?;
                Ok(PerformanceResponse::Single(record))
            }
            None => {
                let results = self
                    .list_performance(request.segmentation, request.tier_filter, request.top_n)
                    .await?;
                Ok(PerformanceResponse::List(PerformanceList { results }))
            }
        }
    }

    /// Performance record for one farmer, ranked against every farmer
    pub async fn farmer_performance(
        &self,
        farmer_id: FarmerId,
        segmentation: Segmentation,
    ) -> AppResult<FarmerPerformanceRecord> {
        self.ensure_exists(farmer_id).await?;
        let as_of = today();

        // Ranking needs every farmer's score; the target's record comes out of the same pass
        let population = self.ranked_population(segmentation, as_of).await?;
        if let Some(record) = population.into_iter().find(|r| r.farmer_id == farmer_id) {
            return Ok(record);
        }

        // Present in the store but not enumerated: score standalone, unranked
        tracing::warn!(%farmer_id, "Farmer missing from enumeration; returning unranked record");
        let metrics = self.aggregator.aggregate(farmer_id, as_of).await?;
        Ok(build_record(farmer_id, &metrics, &self.settings.weights))
    }

    /// Ranked records for all farmers, optionally filtered by tier and truncated.
    ///
    /// Ranks are assigned before filtering, so they reflect each farmer's
    /// position among the whole population.
    pub async fn list_performance(
        &self,
        segmentation: Segmentation,
        tier_filter: Option<Tier>,
        top_n: Option<usize>,
    ) -> AppResult<Vec<FarmerPerformanceRecord>> {
        let population = self.ranked_population(segmentation, today()).await?;
        let total = population.len();
        let results = filter_records(population, tier_filter, top_n);

        tracing::info!(
            ?segmentation,
            ?tier_filter,
            ?top_n,
            farmers = total,
            returned = results.len(),
            "Computed farmer performance list"
        );

        Ok(results)
    }

    /// Sub-metrics and diagnostics for one farmer
    pub async fn farmer_metrics(&self, farmer_id: FarmerId) -> AppResult<FarmerMetricsReport> {
        self.ensure_exists(farmer_id).await?;
        let metrics = self.aggregator.aggregate(farmer_id, today()).await?;
        Ok(FarmerMetricsReport::new(farmer_id, metrics))
    }

    async fn ensure_exists(&self, farmer_id: FarmerId) -> AppResult<()> {
        if self.aggregator.store().farmer_exists(farmer_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Farmer".to_string()))
        }
    }

    /// Score, rank, and (optionally) cluster every farmer
    async fn ranked_population(
        &self,
        segmentation: Segmentation,
        as_of: NaiveDate,
    ) -> AppResult<Vec<FarmerPerformanceRecord>> {
        let farmer_ids = self.aggregator.store().list_farmer_ids().await?;
        let metrics = self.aggregate_all(&farmer_ids, as_of).await?;

        let mut records: Vec<FarmerPerformanceRecord> = farmer_ids
            .iter()
            .zip(&metrics)
            .map(|(&farmer_id, metrics)| build_record(farmer_id, metrics, &self.settings.weights))
            .collect();
        rank_records(&mut records);

        if segmentation == Segmentation::Kmeans {
            let mut rng = self.rng();
            if !apply_cluster_tiers(&mut records, &mut rng) {
                tracing::info!(
                    farmers = records.len(),
                    "Too few farmers to cluster; keeping threshold tiers"
                );
            }
        }

        Ok(records)
    }

    /// Aggregate farmers concurrently, preserving input order in the result
    async fn aggregate_all(
        &self,
        farmer_ids: &[FarmerId],
        as_of: NaiveDate,
    ) -> AppResult<Vec<FarmerMetrics>> {
        let permits = Arc::new(Semaphore::new(self.settings.max_concurrent_aggregations));
        let mut tasks = JoinSet::new();

        for (index, &farmer_id) in farmer_ids.iter().enumerate() {
            let aggregator = self.aggregator.clone();
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Internal(format!("aggregation limiter closed: {}", e)))?;
                let metrics = aggregator.aggregate(farmer_id, as_of).await?;
                Ok::<_, AppError>((index, metrics))
            });
        }

        let mut slots = vec![None; farmer_ids.len()];
        while let Some(joined) = tasks.join_next().await {
            let (index, metrics) = joined
                .map_err(|e| AppError::Internal(format!("aggregation task failed: {}", e)))??;
            slots[index] = Some(metrics);
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| AppError::Internal("missing farmer metrics".to_string()))
            })
            .collect()
    }

    /// Random source for empty-cluster reseeding
    fn rng(&self) -> StdRng {
        match self.settings.kmeans_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
