//! In-memory history store for tests and local demos

use chrono::NaiveDate;
use shared::{DeliveryRecord, FarmerId, QcResult};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::FarmerHistoryStore;
use crate::error::{AppError, AppResult};

#[derive(Debug, Default)]
struct FarmerEntry {
    qc_results: Vec<QcResult>,
    deliveries: Vec<DeliveryRecord>,
    certification_expiries: Vec<Option<NaiveDate>>,
    /// Customer id and qualifying order count, in first-purchase order
    purchases: Vec<(Uuid, u32)>,
}

#[derive(Debug, Default)]
struct Inner {
    order: Vec<FarmerId>,
    farmers: HashMap<FarmerId, FarmerEntry>,
    unavailable: bool,
}

/// Thread-safe store holding everything in process memory.
///
/// Farmers enumerate in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a farmer with no history; no-op if already present
    pub fn add_farmer(&self, farmer_id: FarmerId) -> AppResult<()> {
        let mut inner = self.write()?;
        if !inner.farmers.contains_key(&farmer_id) {
            inner.order.push(farmer_id);
            inner.farmers.insert(farmer_id, FarmerEntry::default());
        }
        Ok(())
    }

    pub fn add_qc_result(&self, farmer_id: FarmerId, qc: QcResult) -> AppResult<()> {
        self.with_farmer(farmer_id, |entry| entry.qc_results.push(qc))
    }

    pub fn add_delivery(&self, farmer_id: FarmerId, status: &str) -> AppResult<()> {
        self.with_farmer(farmer_id, |entry| {
            entry.deliveries.push(DeliveryRecord::new(status))
        })
    }

    /// Add a certification; `None` never expires
    pub fn add_certification(
        &self,
        farmer_id: FarmerId,
        expiry_date: Option<NaiveDate>,
    ) -> AppResult<()> {
        self.with_farmer(farmer_id, |entry| {
            entry.certification_expiries.push(expiry_date)
        })
    }

    /// Record one qualifying order by `customer_id` containing the farmer's products
    pub fn record_purchase(&self, farmer_id: FarmerId, customer_id: Uuid) -> AppResult<()> {
        self.with_farmer(farmer_id, |entry| {
            match entry.purchases.iter_mut().find(|(id, _)| *id == customer_id) {
                Some((_, count)) => *count += 1,
                None => entry.purchases.push((customer_id, 1)),
            }
        })
    }

    /// Simulate an outage; every query fails while set
    pub fn set_unavailable(&self, unavailable: bool) -> AppResult<()> {
        self.write()?.unavailable = unavailable;
        Ok(())
    }

    fn with_farmer(
        &self,
        farmer_id: FarmerId,
        apply: impl FnOnce(&mut FarmerEntry),
    ) -> AppResult<()> {
        let mut inner = self.write()?;
        let entry = inner
            .farmers
            .get_mut(&farmer_id)
            .ok_or_else(|| AppError::NotFound("Farmer".to_string()))?;
        apply(entry);
        Ok(())
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Inner>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| AppError::Internal("history store lock poisoned".to_string()))?;
        if inner.unavailable {
            return Err(AppError::StoreUnavailable("in-memory store offline".to_string()));
        }
        Ok(inner)
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| AppError::Internal("history store lock poisoned".to_string()))
    }

    fn project<T>(&self, farmer_id: FarmerId, view: impl FnOnce(&FarmerEntry) -> T) -> AppResult<T>
    where
        T: Default,
    {
        let inner = self.read()?;
        Ok(inner.farmers.get(&farmer_id).map(view).unwrap_or_default())
    }
}

impl FarmerHistoryStore for InMemoryHistoryStore {
    async fn qc_results_for_farmer(&self, farmer_id: FarmerId) -> AppResult<Vec<QcResult>> {
        self.project(farmer_id, |entry| entry.qc_results.clone())
    }

    async fn deliveries_for_farmer(&self, farmer_id: FarmerId) -> AppResult<Vec<DeliveryRecord>> {
        self.project(farmer_id, |entry| entry.deliveries.clone())
    }

    async fn valid_certification_count(
        &self,
        farmer_id: FarmerId,
        as_of: NaiveDate,
    ) -> AppResult<u32> {
        self.project(farmer_id, |entry| {
            entry
                .certification_expiries
                .iter()
                .filter(|expiry| expiry.map_or(true, |date| date >= as_of))
                .count() as u32
        })
    }

    async fn customer_purchase_counts(&self, farmer_id: FarmerId) -> AppResult<Vec<u32>> {
        self.project(farmer_id, |entry| {
            entry.purchases.iter().map(|(_, count)| *count).collect()
        })
    }

    async fn farmer_exists(&self, farmer_id: FarmerId) -> AppResult<bool> {
        Ok(self.read()?.farmers.contains_key(&farmer_id))
    }

    async fn list_farmer_ids(&self) -> AppResult<Vec<FarmerId>> {
        Ok(self.read()?.order.clone())
    }

    async fn is_available(&self) -> bool {
        self.read().is_ok()
    }
}
