//! PostgreSQL-backed history store

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{DeliveryRecord, FarmerId, QcResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::FarmerHistoryStore;
use crate::error::{AppError, AppResult};

/// History store reading the marketplace database
#[derive(Clone)]
pub struct PgHistoryStore {
    db: PgPool,
}

/// Database row for a QC line item
#[derive(Debug, sqlx::FromRow)]
struct QcRow {
    delivery_id: Uuid,
    expected_quantity: Decimal,
    accepted_quantity: Decimal,
    rejected_quantity: Decimal,
    recorded_at: DateTime<Utc>,
}

impl From<QcRow> for QcResult {
    fn from(row: QcRow) -> Self {
        QcResult {
            delivery_id: row.delivery_id,
            expected_quantity: row.expected_quantity,
            accepted_quantity: row.accepted_quantity,
            rejected_quantity: row.rejected_quantity,
            recorded_at: row.recorded_at,
        }
    }
}

impl PgHistoryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Connectivity failures surface as an unavailable store; anything else is a query error
fn store_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            AppError::StoreUnavailable(err.to_string())
        }
        other => AppError::DatabaseError(other),
    }
}

impl FarmerHistoryStore for PgHistoryStore {
    async fn qc_results_for_farmer(&self, farmer_id: FarmerId) -> AppResult<Vec<QcResult>> {
        let rows = sqlx::query_as::<_, QcRow>(
            r#"
            SELECT
                qc.delivery_id,
                qc.expected_quantity,
                qc.accepted_quantity,
                qc.rejected_quantity,
                qc.recorded_at
            FROM qc_results qc
            JOIN deliveries d ON d.id = qc.delivery_id
            WHERE d.farmer_id = $1
            ORDER BY qc.recorded_at ASC, qc.id ASC
            "#,
        )
        .bind(farmer_id)
        .fetch_all(&self.db)
        .await
        .map_err(store_error)?;

        Ok(rows.into_iter().map(QcResult::from).collect())
    }

    async fn deliveries_for_farmer(&self, farmer_id: FarmerId) -> AppResult<Vec<DeliveryRecord>> {
        let statuses: Vec<String> = sqlx::query_scalar(
            "SELECT status FROM deliveries WHERE farmer_id = $1 ORDER BY scheduled_at ASC, id ASC",
        )
        .bind(farmer_id)
        .fetch_all(&self.db)
        .await
        .map_err(store_error)?;

        Ok(statuses.into_iter().map(DeliveryRecord::new).collect())
    }

    async fn valid_certification_count(
        &self,
        farmer_id: FarmerId,
        as_of: NaiveDate,
    ) -> AppResult<u32> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM certifications
            WHERE farmer_id = $1
              AND (expiry_date IS NULL OR expiry_date >= $2)
            "#,
        )
        .bind(farmer_id)
        .bind(as_of)
        .fetch_one(&self.db)
        .await
        .map_err(store_error)?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn customer_purchase_counts(&self, farmer_id: FarmerId) -> AppResult<Vec<u32>> {
        let counts: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT o.id)
            FROM orders o
            JOIN order_items oi ON oi.order_id = o.id
            JOIN products p ON p.id = oi.product_id
            WHERE p.farmer_id = $1
              AND o.status <> 'cancelled'
            GROUP BY o.customer_id
            "#,
        )
        .bind(farmer_id)
        .fetch_all(&self.db)
        .await
        .map_err(store_error)?;

        Ok(counts
            .into_iter()
            .map(|count| u32::try_from(count).unwrap_or(u32::MAX))
            .collect())
    }

    async fn farmer_exists(&self, farmer_id: FarmerId) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM farmers WHERE id = $1)")
                .bind(farmer_id)
                .fetch_one(&self.db)
                .await
                .map_err(store_error)?;

        Ok(exists)
    }

    async fn list_farmer_ids(&self) -> AppResult<Vec<FarmerId>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM farmers ORDER BY created_at ASC, id ASC")
                .fetch_all(&self.db)
                .await
                .map_err(store_error)?;

        Ok(ids)
    }

    async fn is_available(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.db).await.is_ok()
    }
}
