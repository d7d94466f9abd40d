//! bookstore-api library interface
//!
//! Inventory ingestion and store reporting over HTTP. Exposes the router and
//! services for integration testing.

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use bookstore_common::config::ServiceConfig;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{PdfReportRenderer, ReportRenderer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    pub config: Arc<ServiceConfig>,
    /// Report document renderer
    pub renderer: Arc<dyn ReportRenderer>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create state with the PDF renderer
    pub fn new(db: SqlitePool, config: ServiceConfig) -> Self {
        Self::with_renderer(db, config, Arc::new(PdfReportRenderer))
    }

    pub fn with_renderer(
        db: SqlitePool,
        config: ServiceConfig,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            renderer,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .merge(api::health_routes())
        .merge(api::inventory_routes(max_upload_bytes))
        .merge(api::store_routes())
        .fallback(api::route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
