//! Operational history consumed by the performance engine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Farmer identifier
pub type FarmerId = Uuid;

/// Quality-control outcome for one product line within one delivery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QcResult {
    pub delivery_id: Uuid,
    pub expected_quantity: Decimal,
    pub accepted_quantity: Decimal,
    pub rejected_quantity: Decimal,
    pub recorded_at: DateTime<Utc>,
}

impl QcResult {
    pub fn new(
        delivery_id: Uuid,
        expected_quantity: Decimal,
        accepted_quantity: Decimal,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            delivery_id,
            expected_quantity,
            accepted_quantity,
            rejected_quantity: (expected_quantity - accepted_quantity).max(Decimal::ZERO),
            recorded_at,
        }
    }
}

/// A delivery made by a farmer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub status: String,
}

impl DeliveryRecord {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    /// Case-insensitive match against the "delivered" status
    pub fn is_delivered(&self) -> bool {
        self.status.eq_ignore_ascii_case(DELIVERED_STATUS)
    }
}

/// Status string marking a completed delivery
pub const DELIVERED_STATUS: &str = "delivered";

/// Point-in-time snapshot of everything the aggregator reads for one farmer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmerHistory {
    pub qc_results: Vec<QcResult>,
    pub deliveries: Vec<DeliveryRecord>,
    /// Certifications that are unexpired as of the snapshot date
    pub valid_certifications: u32,
    /// Qualifying order count for each distinct purchasing customer
    pub customer_purchase_counts: Vec<u32>,
}
