//! Tabular export of performance results

use serde::Serialize;
use shared::{FarmerPerformanceRecord, PerformanceExportRow};

use crate::error::{AppError, AppResult};

/// Export performance records as CSV, one flattened row per farmer
pub fn export_performance_csv(records: &[FarmerPerformanceRecord]) -> AppResult<String> {
    let rows: Vec<PerformanceExportRow> = records.iter().map(PerformanceExportRow::from).collect();
    export_to_csv(&rows)
}

/// Export serializable rows as CSV with a header line
pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}
