//! Validation utilities for the performance query surface
//!
//! Parameters arrive as strings; everything is checked here before any
//! history is read so malformed requests never reach the engine.

use std::str::FromStr;

use crate::models::{FarmerId, Segmentation, Tier};
use crate::types::{ExportFormat, PerformanceQuery, PerformanceRequest};

/// A rejected query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Validate a farmer identifier (UUID)
pub fn validate_farmer_id(raw: &str) -> Result<FarmerId, &'static str> {
    FarmerId::parse_str(raw.trim()).map_err(|_| "Farmer ID must be a valid UUID")
}

/// Validate a tier filter (exact, case-insensitive tier name)
pub fn validate_tier_filter(raw: &str) -> Result<Tier, &'static str> {
    Tier::from_str(raw)
}

/// Validate top_n is a positive integer
pub fn validate_top_n(raw: &str) -> Result<usize, &'static str> {
    let value: usize = raw
        .trim()
        .parse()
        .map_err(|_| "top_n must be a positive integer")?;
    if value == 0 {
        return Err("top_n must be a positive integer");
    }
    Ok(value)
}

/// Validate the segmentation mode
pub fn validate_segmentation(raw: &str) -> Result<Segmentation, &'static str> {
    Segmentation::from_str(raw.trim())
}

/// Validate the export format
pub fn validate_format(raw: &str) -> Result<ExportFormat, &'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(ExportFormat::Json),
        "csv" => Ok(ExportFormat::Csv),
        _ => Err("format must be either json or csv"),
    }
}

/// Validate all query parameters. Empty parameters are treated as absent.
pub fn validate_performance_query(
    query: &PerformanceQuery,
) -> Result<PerformanceRequest, FieldError> {
    fn field<T>(
        name: &'static str,
        raw: &Option<String>,
        parse: fn(&str) -> Result<T, &'static str>,
    ) -> Result<Option<T>, FieldError> {
        match raw.as_deref() {
            Some(value) if !value.trim().is_empty() => parse(value)
                .map(Some)
                .map_err(|message| FieldError { field: name, message }),
            _ => Ok(None),
        }
    }

    Ok(PerformanceRequest {
        farmer_id: field("farmer_id", &query.farmer_id, validate_farmer_id)?,
        tier_filter: field("tier_filter", &query.tier_filter, validate_tier_filter)?,
        top_n: field("top_n", &query.top_n, validate_top_n)?,
        segmentation: field("segmentation", &query.segmentation, validate_segmentation)?
            .unwrap_or_default(),
        format: field("format", &query.format, validate_format)?.unwrap_or_default(),
    })
}
