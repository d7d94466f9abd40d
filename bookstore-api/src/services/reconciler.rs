//! Upsert reconciler
//!
//! Applies one validated inventory record to the database: resolves the
//! store, author and book by natural key, then creates or increments the
//! store's holding of that book. The four steps share one transaction, so a
//! record either lands completely or not at all; earlier records of the same
//! batch are unaffected by a later failure.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::db::inventory::{
    find_or_create_author, find_or_create_book, find_or_create_or_increment_store_book,
    find_or_create_store,
};
use crate::services::record_validator::InventoryRecord;

/// What happened to the store's holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

/// A record that was applied
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledRecord {
    pub success: bool,
    pub store_name: String,
    pub book_name: String,
    pub author_name: String,
    pub action: UpsertAction,
    /// Copies held after this record was applied
    pub copies: i64,
}

/// A record the database rejected
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRecord {
    pub success: bool,
    pub error: String,
    pub record: InventoryRecord,
}

/// Per-record result
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Reconciled(ReconciledRecord),
    Failed(FailedRecord),
}

/// Applies inventory records to the database
#[derive(Debug, Clone)]
pub struct InventoryReconciler {
    pool: SqlitePool,
}

impl InventoryReconciler {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Apply one record; failures are reported, never raised
    pub async fn reconcile(&self, record: &InventoryRecord) -> RecordOutcome {
        match self.apply(record).await {
            Ok(reconciled) => {
                debug!(
                    store = %reconciled.store_name,
                    book = %reconciled.book_name,
                    action = ?reconciled.action,
                    copies = reconciled.copies,
                    "Inventory record applied"
                );
                RecordOutcome::Reconciled(reconciled)
            }
            Err(e) => {
                warn!(
                    store = %record.store_name,
                    book = %record.book_name,
                    error = %e,
                    "Inventory record rejected"
                );
                RecordOutcome::Failed(FailedRecord {
                    success: false,
                    error: e.to_string(),
                    record: record.clone(),
                })
            }
        }
    }

    async fn apply(&self, record: &InventoryRecord) -> bookstore_common::Result<ReconciledRecord> {
        // Dropping the transaction on an early return rolls the record back
        let mut tx = self.pool.begin().await?;

        let store = find_or_create_store(&mut tx, &record.store_name, &record.store_address)
            .await?
            .entity;
        let author = find_or_create_author(&mut tx, &record.author_name)
            .await?
            .entity;
        let book = find_or_create_book(&mut tx, &record.book_name, record.pages, author.id)
            .await?
            .entity;
        let holding =
            find_or_create_or_increment_store_book(&mut tx, store.id, book.id, record.price)
                .await?;

        tx.commit().await?;

        Ok(ReconciledRecord {
            success: true,
            store_name: store.name,
            book_name: book.name,
            author_name: author.name,
            action: if holding.created {
                UpsertAction::Created
            } else {
                UpsertAction::Updated
            },
            copies: holding.entity.copies,
        })
    }
}
