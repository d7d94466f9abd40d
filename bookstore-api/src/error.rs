//! Error types for bookstore-api
//!
//! Row and record failures never reach this type; they are reported inside
//! successful batch responses. `ApiError` covers whole-request rejections and
//! unexpected faults.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookstore_common::config::RunMode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::record_validator::{CsvParseError, RowError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request carried no file in the `file` field (400)
    #[error("No file uploaded")]
    MissingFile,

    /// Uploaded file is not CSV (400)
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    /// Multipart body could not be read (status chosen by axum, e.g. 413)
    #[error("Upload rejected: {message}")]
    UploadRejected { status: StatusCode, message: String },

    /// CSV could not be tokenized, or every row was invalid (400)
    #[error(transparent)]
    CsvParse(CsvParseError),

    /// CSV parsed but held no valid record (400)
    #[error("No valid records found")]
    NoValidRecords { parse_errors: Vec<RowError> },

    /// Store id path parameter is not numeric (400)
    #[error("Invalid store ID: {0}")]
    InvalidStoreId(String),

    /// Store does not exist (404)
    #[error("Store with ID {0} does not exist")]
    StoreNotFound(i64),

    /// Unexpected fault (500); `details` is only filled in development mode
    #[error("{message}")]
    Internal {
        message: &'static str,
        details: Option<String>,
    },
}

impl ApiError {
    /// Log an unexpected fault and wrap it for the response
    pub fn internal(message: &'static str, err: impl std::fmt::Display, mode: RunMode) -> Self {
        error!(error = %err, "{}", message);
        ApiError::Internal {
            message,
            details: mode.is_development().then(|| err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingFile => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "No file uploaded",
                    "message": "Please upload a CSV file",
                }),
            ),
            ApiError::UnsupportedFile(name) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Invalid file type",
                    "message": format!("Only CSV files are allowed (got '{}')", name),
                }),
            ),
            ApiError::UploadRejected { status, message } => (
                status,
                json!({
                    "error": "Upload rejected",
                    "message": message,
                }),
            ),
            ApiError::CsvParse(CsvParseError::NoValidRows { errors }) => {
                let message = format!("CSV parsing failed. {} error(s) found.", errors.len());
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "CSV parsing failed",
                        "message": message,
                        "errors": errors,
                    }),
                )
            }
            ApiError::CsvParse(err) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "CSV parsing failed",
                    "message": err.to_string(),
                }),
            ),
            ApiError::NoValidRecords { parse_errors } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "No valid records found",
                    "message": "CSV file contains no valid data",
                    "errors": parse_errors,
                }),
            ),
            ApiError::InvalidStoreId(_) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "Invalid store ID",
                    "message": "Store ID must be a valid number",
                }),
            ),
            ApiError::StoreNotFound(id) => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "Store not found",
                    "message": format!("Store with ID {} does not exist", id),
                }),
            ),
            ApiError::Internal { message, details } => {
                let mut body = json!({
                    "error": "Internal server error",
                    "message": message,
                });
                if let Some(details) = details {
                    body["details"] = json!(details);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
