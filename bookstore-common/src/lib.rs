//! # Bookstore Common Library
//!
//! Shared code for the bookstore inventory services:
//! - Persisted models (stores, authors, books, store holdings)
//! - Database initialization and schema creation
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
