//! Batch orchestration
//!
//! Drives a parsed upload through the reconciler one record at a time, in
//! input order. Each record is awaited before the next starts, so duplicate
//! (store, book) rows within a batch see copies 1, 2, ... N deterministically.

use serde::Serialize;
use tracing::info;

use crate::services::reconciler::{FailedRecord, InventoryReconciler, ReconciledRecord, RecordOutcome};
use crate::services::record_validator::{ParsedInventory, RowError};

/// Counts reported for a processed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_records: usize,
    pub successful: usize,
    pub failed: usize,
    pub parse_errors: usize,
}

/// Overall batch outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// No parse errors and no reconciliation failures
    Complete,
    /// Some rows failed to parse or reconcile
    Partial,
}

/// Everything a processed batch produced
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub results: Vec<ReconciledRecord>,
    pub parse_errors: Vec<RowError>,
    pub process_errors: Vec<FailedRecord>,
}

impl BatchReport {
    pub fn status(&self) -> BatchStatus {
        if self.parse_errors.is_empty() && self.process_errors.is_empty() {
            BatchStatus::Complete
        } else {
            BatchStatus::Partial
        }
    }
}

/// A batch refused before any reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedBatch {
    pub parse_errors: Vec<RowError>,
}

/// Run every valid record of a parsed upload through the reconciler
///
/// Returns [`RejectedBatch`] without touching the database when the upload
/// holds no valid record.
pub async fn process_batch(
    reconciler: &InventoryReconciler,
    parsed: ParsedInventory,
) -> Result<BatchReport, RejectedBatch> {
    let ParsedInventory {
        records,
        errors: parse_errors,
    } = parsed;

    if records.is_empty() {
        return Err(RejectedBatch { parse_errors });
    }

    let mut results = Vec::new();
    let mut process_errors = Vec::new();

    for record in &records {
        match reconciler.reconcile(record).await {
            RecordOutcome::Reconciled(reconciled) => results.push(reconciled),
            RecordOutcome::Failed(failed) => process_errors.push(failed),
        }
    }

    let summary = BatchSummary {
        total_records: records.len(),
        successful: results.len(),
        failed: process_errors.len(),
        parse_errors: parse_errors.len(),
    };

    info!(
        total = summary.total_records,
        successful = summary.successful,
        failed = summary.failed,
        parse_errors = summary.parse_errors,
        "Inventory batch processed"
    );

    Ok(BatchReport {
        summary,
        results,
        parse_errors,
        process_errors,
    })
}
