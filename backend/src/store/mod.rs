//! Read-only access to farmers' operational history
//!
//! The engine never writes. Implementations only need to answer the six
//! queries below for a point-in-time snapshot.

mod memory;
mod postgres;

pub use memory::InMemoryHistoryStore;
pub use postgres::PgHistoryStore;

use chrono::NaiveDate;
use shared::{DeliveryRecord, FarmerId, QcResult};
use std::future::Future;

use crate::error::AppResult;

/// Collaborator query surface consumed by the metric aggregator
pub trait FarmerHistoryStore: Clone + Send + Sync + 'static {
    /// QC line items across all of the farmer's deliveries
    fn qc_results_for_farmer(
        &self,
        farmer_id: FarmerId,
    ) -> impl Future<Output = AppResult<Vec<QcResult>>> + Send;

    fn deliveries_for_farmer(
        &self,
        farmer_id: FarmerId,
    ) -> impl Future<Output = AppResult<Vec<DeliveryRecord>>> + Send;

    /// Certifications without an expiry date, or expiring on or after `as_of`
    fn valid_certification_count(
        &self,
        farmer_id: FarmerId,
        as_of: NaiveDate,
    ) -> impl Future<Output = AppResult<u32>> + Send;

    /// One qualifying order count per distinct customer who bought the farmer's products
    fn customer_purchase_counts(
        &self,
        farmer_id: FarmerId,
    ) -> impl Future<Output = AppResult<Vec<u32>>> + Send;

    fn farmer_exists(&self, farmer_id: FarmerId) -> impl Future<Output = AppResult<bool>> + Send;

    /// All farmers, in the store's stable enumeration order
    fn list_farmer_ids(&self) -> impl Future<Output = AppResult<Vec<FarmerId>>> + Send;

    /// Whether the backing store is reachable, for health reporting
    fn is_available(&self) -> impl Future<Output = bool> + Send;
}
