//! Database models
//!
//! Row types for the four inventory relations. Identities are SQLite integer
//! row ids; timestamps are maintained by the database.

use chrono::NaiveDateTime;
use serde::Serialize;

/// A physical bookstore, deduplicated by (name, address)
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A book author, deduplicated by name alone
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A book, deduplicated by (name, pages, author_id)
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub pages: i64,
    pub author_id: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Stocking state of one book at one store
///
/// At most one row exists per (store_id, book_id). `sold_out` is never set
/// by ingestion; it only filters report queries.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StoreBook {
    pub id: i64,
    pub store_id: i64,
    pub book_id: i64,
    pub price: f64,
    pub copies: i64,
    pub sold_out: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
