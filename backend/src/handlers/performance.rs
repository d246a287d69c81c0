//! HTTP handlers for farmer performance endpoints

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use shared::{
    validate_farmer_id, validate_performance_query, ExportFormat, FarmerMetricsReport,
    PerformanceQuery, PerformanceResponse,
};

use crate::error::{AppError, AppResult};
use crate::services::export::export_performance_csv;
use crate::services::RankingService;
use crate::store::FarmerHistoryStore;
use crate::AppState;

/// Get performance for one farmer (`farmer_id`) or the ranked list of all farmers
pub async fn get_performance<S: FarmerHistoryStore>(
    State(state): State<AppState<S>>,
    query: Result<Query<PerformanceQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let request = validate_performance_query(&query)?;
    if request.farmer_id.is_some() && request.format == ExportFormat::Csv {
        return Err(AppError::Validation {
            field: "format".to_string(),
            message: "CSV export is only available for list queries".to_string(),
        });
    }

    let service = RankingService::new(state.store.clone(), state.settings.clone());
    let response = service.performance(&request).await?;

    match (request.format, response) {
        (ExportFormat::Csv, PerformanceResponse::List(list)) => {
            let csv = export_performance_csv(&list.results)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"farmer_performance.csv\"",
                    ),
                ],
                csv,
            )
                .into_response())
        }
        (_, response) => Ok(Json(response).into_response()),
    }
}

/// Get aggregated sub-metrics and diagnostics for one farmer
pub async fn get_farmer_metrics<S: FarmerHistoryStore>(
    State(state): State<AppState<S>>,
    Path(farmer_id): Path<String>,
) -> AppResult<Json<FarmerMetricsReport>> {
    let farmer_id = validate_farmer_id(&farmer_id).map_err(|message| AppError::Validation {
        field: "farmer_id".to_string(),
        message: message.to_string(),
    })?;

    let service = RankingService::new(state.store.clone(), state.settings.clone());
    let report = service.farmer_metrics(farmer_id).await?;
    Ok(Json(report))
}
