//! Store report download endpoint

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::services::pdf_renderer::report_filename;
use crate::services::report_aggregator::ReportAggregator;
use crate::AppState;

/// GET /api/stores/:id/download-report
///
/// Streams the store's sales report as a PDF attachment.
pub async fn download_store_report(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Response> {
    let store_id: i64 = raw_id
        .trim()
        .parse()
        .map_err(|_| ApiError::InvalidStoreId(raw_id.clone()))?;

    let mode = state.config.mode;
    let aggregator = ReportAggregator::new(state.db.clone(), state.config.report_limit);

    let report = aggregator
        .store_report(store_id)
        .await
        .map_err(|e| ApiError::internal("Failed to generate store report", e, mode))?
        .ok_or(ApiError::StoreNotFound(store_id))?;

    let filename = report_filename(&report.store.name, Utc::now().date_naive());

    let renderer = state.renderer.clone();
    let content_type = renderer.content_type();
    let document = tokio::task::spawn_blocking(move || renderer.render(&report))
        .await
        .map_err(|e| ApiError::internal("Failed to generate store report", e, mode))?
        .map_err(|e| ApiError::internal("Failed to generate store report", e, mode))?;

    info!(store_id, file = %filename, bytes = document.len(), "Store report generated");

    let headers = [
        (header::CONTENT_TYPE, content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
        (header::CONTENT_LENGTH, document.len().to_string()),
    ];

    Ok((headers, document).into_response())
}

/// Build store routes
pub fn store_routes() -> Router<AppState> {
    Router::new().route("/api/stores/:id/download-report", get(download_store_report))
}
