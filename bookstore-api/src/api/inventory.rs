//! Inventory upload endpoint
//!
//! POST /api/inventory/upload accepts a multipart body whose `file` field
//! holds an inventory CSV. The upload is staged in a temporary file, parsed,
//! and every valid record is reconciled in order.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::services::batch::{process_batch, BatchStatus, BatchSummary};
use crate::services::reconciler::{FailedRecord, InventoryReconciler, ReconciledRecord};
use crate::services::record_validator::{parse_csv_path, CsvParseError, ParsedInventory, RowError};
use crate::AppState;

/// Multipart field carrying the CSV file
pub const UPLOAD_FIELD: &str = "file";

const CSV_CONTENT_TYPES: [&str; 4] = [
    "text/csv",
    "application/csv",
    "application/vnd.ms-excel",
    "text/plain",
];

/// Per-row and per-record failures of a partially successful batch
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadErrors {
    pub parse_errors: Vec<RowError>,
    pub process_errors: Vec<FailedRecord>,
}

/// POST /api/inventory/upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub summary: BatchSummary,
    pub results: Vec<ReconciledRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<UploadErrors>,
}

/// A file field that was accepted for parsing
struct UploadedCsv {
    file_name: String,
    bytes: axum::body::Bytes,
}

/// POST /api/inventory/upload
///
/// 200 when every row was applied, 207 when some rows failed to parse or
/// reconcile, 400 when there is no file or no valid record.
pub async fn upload_inventory(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let mut multipart = multipart.map_err(|_| ApiError::MissingFile)?;
    let upload = read_csv_field(&mut multipart, state.config.max_upload_bytes)
        .await?
        .ok_or(ApiError::MissingFile)?;

    info!(
        file = %upload.file_name,
        bytes = upload.bytes.len(),
        "Inventory upload received"
    );

    let upload_dir = state.config.upload_dir.clone();
    let parsed = tokio::task::spawn_blocking(move || stage_and_parse(&upload_dir, &upload.bytes))
        .await
        .map_err(|e| ApiError::internal("Failed to process inventory upload", e, state.config.mode))?;

    let parsed = match parsed {
        Ok(parsed) => parsed,
        Err(CsvParseError::Io(e)) => {
            return Err(ApiError::internal(
                "Failed to process inventory upload",
                e,
                state.config.mode,
            ))
        }
        Err(e) => return Err(ApiError::CsvParse(e)),
    };

    let reconciler = InventoryReconciler::new(state.db.clone());
    let report = process_batch(&reconciler, parsed)
        .await
        .map_err(|rejected| ApiError::NoValidRecords {
            parse_errors: rejected.parse_errors,
        })?;

    let status = match report.status() {
        BatchStatus::Complete => StatusCode::OK,
        BatchStatus::Partial => StatusCode::MULTI_STATUS,
    };

    let errors = (status == StatusCode::MULTI_STATUS).then(|| UploadErrors {
        parse_errors: report.parse_errors,
        process_errors: report.process_errors,
    });

    let body = UploadResponse {
        message: "Inventory processed successfully".to_string(),
        summary: report.summary,
        results: report.results,
        errors,
    };

    Ok((status, Json(body)).into_response())
}

/// Find the `file` field and read it; `None` when the form has no file
async fn read_csv_field(
    multipart: &mut Multipart,
    max_upload_bytes: usize,
) -> ApiResult<Option<UploadedCsv>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_rejected(e, max_upload_bytes))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // A plain form value under the same name is not a file
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        if !is_csv_upload(&file_name, field.content_type()) {
            return Err(ApiError::UnsupportedFile(file_name));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_rejected(e, max_upload_bytes))?;

        return Ok(Some(UploadedCsv { file_name, bytes }));
    }

    Ok(None)
}

fn upload_rejected(err: MultipartError, max_upload_bytes: usize) -> ApiError {
    let status = err.status();
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
        format!("Upload exceeds the {} byte limit", max_upload_bytes)
    } else {
        err.body_text()
    };
    warn!(%status, error = %err, "Inventory upload rejected");
    ApiError::UploadRejected { status, message }
}

/// Accept by `.csv` extension or by a CSV-compatible content type
pub fn is_csv_upload(file_name: &str, content_type: Option<&str>) -> bool {
    let by_extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let by_content_type = content_type
        .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
        .is_some_and(|ct| CSV_CONTENT_TYPES.contains(&ct.as_str()));

    by_extension || by_content_type
}

/// Write the upload to a temporary file in `upload_dir` and parse it
///
/// The staged file is removed before returning on every path; a panic while
/// parsing still removes it when the handle drops.
fn stage_and_parse(upload_dir: &Path, bytes: &[u8]) -> Result<ParsedInventory, CsvParseError> {
    let mut staged = tempfile::Builder::new()
        .prefix("inventory-")
        .suffix(".csv")
        .tempfile_in(upload_dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;

    let parsed = parse_csv_path(staged.path());
    discard(staged);
    parsed
}

fn discard(staged: NamedTempFile) {
    let path = staged.path().to_path_buf();
    if let Err(e) = staged.close() {
        warn!(path = %path.display(), error = %e, "Failed to delete staged upload");
    }
}

/// Build inventory routes with the configured upload size cap
pub fn inventory_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/inventory/upload", post(upload_inventory))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
