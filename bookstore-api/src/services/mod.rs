//! Inventory ingestion and reporting services

pub mod batch;
pub mod pdf_renderer;
pub mod reconciler;
pub mod record_validator;
pub mod report_aggregator;

pub use batch::{process_batch, BatchReport, BatchStatus, BatchSummary};
pub use pdf_renderer::{PdfReportRenderer, ReportRenderer};
pub use reconciler::{InventoryReconciler, RecordOutcome, UpsertAction};
pub use record_validator::{parse_csv_bytes, parse_csv_path, InventoryRecord, ParsedInventory};
pub use report_aggregator::{ReportAggregator, StoreReport};
