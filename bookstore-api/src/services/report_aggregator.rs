//! Store report aggregation
//!
//! Builds the data behind a store's sales report: the priciest in-stock books
//! and the most prolific authors. Both rankings are computed from a single
//! read of the store's in-stock holdings.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

use crate::db::reports::{load_in_stock_holdings, load_store, Holding};

/// Store identity shown on the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub id: i64,
    pub name: String,
    pub address: String,
}

/// Entry of the priciest-books ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedBook {
    pub name: String,
    pub author_name: String,
    /// Price with exactly two decimals
    pub price: String,
    pub copies: i64,
}

/// Entry of the prolific-authors ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAuthor {
    pub id: i64,
    pub name: String,
    pub total_books: i64,
    pub total_copies: i64,
}

/// Report payload handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreReport {
    pub store: StoreSummary,
    pub report_date: String,
    pub top_books: Vec<RankedBook>,
    pub top_authors: Vec<RankedAuthor>,
}

/// "October 19, 2026"
pub fn report_date_label(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Highest-priced holdings first; equal prices keep holding order
pub fn top_priciest_books(holdings: &[Holding], limit: usize) -> Vec<RankedBook> {
    let mut ranked: Vec<&Holding> = holdings.iter().collect();
    ranked.sort_by(|a, b| b.price.total_cmp(&a.price));

    ranked
        .into_iter()
        .take(limit)
        .map(|h| RankedBook {
            name: h.book_name.clone(),
            author_name: h.author_name.clone(),
            price: format!("{:.2}", h.price),
            copies: h.copies,
        })
        .collect()
}

/// Authors ranked by distinct books held, then by total copies
///
/// Grouping is keyed by author id in ascending order, which fixes the order
/// of authors tied on both criteria.
pub fn top_prolific_authors(holdings: &[Holding], limit: usize) -> Vec<RankedAuthor> {
    let mut tallies: BTreeMap<i64, RankedAuthor> = BTreeMap::new();

    for holding in holdings {
        let tally = tallies
            .entry(holding.author_id)
            .or_insert_with(|| RankedAuthor {
                id: holding.author_id,
                name: holding.author_name.clone(),
                total_books: 0,
                total_copies: 0,
            });
        // One holding per (store, book), so each row is a distinct book
        tally.total_books += 1;
        tally.total_copies += holding.copies;
    }

    let mut ranked: Vec<RankedAuthor> = tallies.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total_books
            .cmp(&a.total_books)
            .then_with(|| b.total_copies.cmp(&a.total_copies))
    });
    ranked.truncate(limit);
    ranked
}

/// Reads store holdings and ranks them
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    pool: SqlitePool,
    limit: usize,
}

impl ReportAggregator {
    pub fn new(pool: SqlitePool, limit: usize) -> Self {
        Self { pool, limit }
    }

    /// Report for today's local date; `None` when the store does not exist
    pub async fn store_report(&self, store_id: i64) -> bookstore_common::Result<Option<StoreReport>> {
        self.store_report_on(store_id, Local::now().date_naive()).await
    }

    /// Report labelled with the given date
    pub async fn store_report_on(
        &self,
        store_id: i64,
        date: NaiveDate,
    ) -> bookstore_common::Result<Option<StoreReport>> {
        // Store row and holdings come from one snapshot
        let mut tx = self.pool.begin().await?;

        let Some(store) = load_store(&mut tx, store_id).await? else {
            return Ok(None);
        };
        let holdings = load_in_stock_holdings(&mut tx, store_id).await?;

        tx.commit().await?;

        Ok(Some(StoreReport {
            store: StoreSummary {
                id: store.id,
                name: store.name,
                address: store.address,
            },
            report_date: report_date_label(date),
            top_books: top_priciest_books(&holdings, self.limit),
            top_authors: top_prolific_authors(&holdings, self.limit),
        }))
    }
}
