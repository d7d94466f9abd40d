//! Inventory CSV validation and normalization
//!
//! Turns raw CSV rows into typed [`InventoryRecord`]s. A bad row never aborts
//! the batch: it becomes a [`RowError`] carrying the 1-indexed row number and
//! the raw cells. Only a file that yields errors and no valid record at all,
//! or a file the CSV reader cannot tokenize, fails as a whole.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::db::inventory::round_to_cents;

/// Columns every data row must provide (exact, case-sensitive header names)
pub const REQUIRED_FIELDS: [&str; 6] = [
    "store_name",
    "store_address",
    "book_name",
    "pages",
    "author_name",
    "price",
];

/// Error message for a non-positive or non-integer page count
pub const INVALID_PAGES: &str = "Invalid pages value. Must be a positive integer.";

/// Error message for a negative or unparseable price
pub const INVALID_PRICE: &str = "Invalid price value. Must be a non-negative number.";

/// One CSV data row keyed by header name
pub type RawRow = BTreeMap<String, String>;

/// A validated, trimmed inventory row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub store_name: String,
    pub store_address: String,
    pub book_name: String,
    pub pages: i64,
    pub author_name: String,
    pub price: f64,
}

/// A row rejected during validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    /// 1-indexed data row number (header excluded)
    pub row: usize,
    pub error: String,
    pub data: RawRow,
}

/// Outcome of validating a single row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Every required field blank; treated as a formatting artifact
    Skipped,
    Valid(InventoryRecord),
    Invalid(String),
}

/// Valid records and row errors, both in original row order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedInventory {
    pub records: Vec<InventoryRecord>,
    pub errors: Vec<RowError>,
}

/// Whole-file parse failures
#[derive(Debug, Error)]
pub enum CsvParseError {
    /// The CSV reader could not tokenize the input
    #[error("CSV parsing failed: {0}")]
    Malformed(#[from] csv::Error),

    /// Every non-blank row was rejected
    #[error("CSV parsing failed. {} error(s) found.", .errors.len())]
    NoValidRows { errors: Vec<RowError> },

    #[error("Failed to read CSV file: {0}")]
    Io(#[from] std::io::Error),
}

fn field<'a>(row: &'a RawRow, name: &str) -> Option<&'a str> {
    row.get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// Validate and normalize one raw row
pub fn validate_row(row: &RawRow) -> RowOutcome {
    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|name| field(row, name).is_none())
        .collect();

    if missing.len() == REQUIRED_FIELDS.len() {
        return RowOutcome::Skipped;
    }
    if !missing.is_empty() {
        return RowOutcome::Invalid(format!(
            "Missing required fields: {}",
            missing.join(", ")
        ));
    }

    // All required fields are present past this point
    let text = |name: &str| field(row, name).unwrap_or_default().to_string();

    let pages = match text("pages").parse::<i64>() {
        Ok(pages) if pages > 0 => pages,
        _ => return RowOutcome::Invalid(INVALID_PAGES.to_string()),
    };

    // Must still be finite once rounded to cents for storage
    let price = match text("price").parse::<f64>() {
        Ok(price) if price >= 0.0 && round_to_cents(price).is_finite() => price,
        _ => return RowOutcome::Invalid(INVALID_PRICE.to_string()),
    };

    RowOutcome::Valid(InventoryRecord {
        store_name: text("store_name"),
        store_address: text("store_address"),
        book_name: text("book_name"),
        pages,
        author_name: text("author_name"),
        price,
    })
}

/// Validate a full row sequence
///
/// Row numbers count every data row, skipped blank rows included. Fails with
/// [`CsvParseError::NoValidRows`] when errors exist and nothing was valid; a
/// sequence with no errors and no records (header only) succeeds empty.
pub fn validate_rows<I>(rows: I) -> Result<ParsedInventory, CsvParseError>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut parsed = ParsedInventory::default();

    for (index, row) in rows.into_iter().enumerate() {
        match validate_row(&row) {
            RowOutcome::Skipped => {}
            RowOutcome::Valid(record) => parsed.records.push(record),
            RowOutcome::Invalid(error) => parsed.errors.push(RowError {
                row: index + 1,
                error,
                data: row,
            }),
        }
    }

    if !parsed.errors.is_empty() && parsed.records.is_empty() {
        return Err(CsvParseError::NoValidRows {
            errors: parsed.errors,
        });
    }

    Ok(parsed)
}

/// Read CSV rows from any reader and validate them
///
/// Extra columns are ignored; short rows are tolerated and their absent
/// cells count as missing fields.
pub fn parse_csv_reader<R: Read>(reader: R) -> Result<ParsedInventory, CsvParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), cell.to_string()))
            .collect();
        rows.push(row);
    }

    validate_rows(rows)
}

/// Parse a staged upload on disk
pub fn parse_csv_path(path: &Path) -> Result<ParsedInventory, CsvParseError> {
    let file = std::fs::File::open(path)?;
    parse_csv_reader(std::io::BufReader::new(file))
}

/// Parse an in-memory CSV buffer
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<ParsedInventory, CsvParseError> {
    parse_csv_reader(bytes)
}
