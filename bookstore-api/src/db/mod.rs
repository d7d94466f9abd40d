//! Database access for bookstore-api
//!
//! Schema creation lives in `bookstore_common::db`; this module holds the
//! queries the ingestion and reporting paths run against it.

pub mod inventory;
pub mod reports;
