//! HTTP API handlers for bookstore-api

pub mod health;
pub mod inventory;
pub mod stores;

pub use health::health_routes;
pub use inventory::inventory_routes;
pub use stores::store_routes;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

/// Fallback for unknown routes
pub async fn route_not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Route not found" })))
}
