//! Shared test utilities for bookstore-api integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use bookstore_api::{build_router, AppState};
use bookstore_common::config::{RunMode, ServiceConfig};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const HEADER: &str = "store_name,store_address,book_name,pages,author_name,price\n";

const BOUNDARY: &str = "----bookstore-test-boundary";

/// Router plus the resources it depends on
///
/// `dir` must be kept alive for the duration of the test.
pub struct TestApp {
    pub dir: TempDir,
    pub pool: SqlitePool,
    pub router: Router,
}

impl TestApp {
    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }
}

/// Create temporary database with schema applied
pub async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let pool = bookstore_common::db::init_database(&dir.path().join("bookstore.db"))
        .await
        .expect("Failed to init database");
    (dir, pool)
}

/// Create app backed by a temp-file database
pub async fn setup_app() -> TestApp {
    setup_app_with_mode(RunMode::Production).await
}

pub async fn setup_app_with_mode(mode: RunMode) -> TestApp {
    setup_app_with(|config| config.mode = mode).await
}

/// Create app after applying `customize` to the test configuration
pub async fn setup_app_with(customize: impl FnOnce(&mut ServiceConfig)) -> TestApp {
    let (dir, pool) = setup_test_db().await;
    let upload_dir = dir.path().join("uploads");
    std::fs::create_dir_all(&upload_dir).expect("Failed to create upload dir");

    let mut config = ServiceConfig {
        database_path: dir.path().join("bookstore.db"),
        upload_dir,
        mode: RunMode::Production,
        ..ServiceConfig::default()
    };
    customize(&mut config);

    let router = build_router(AppState::new(pool.clone(), config));
    TestApp { dir, pool, router }
}

/// Multipart request carrying `csv` in the `file` field
pub fn upload_request(csv: &str, file_name: &str, content_type: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\
         \r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );

    Request::builder()
        .method("POST")
        .uri("/api/inventory/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn csv_upload(csv: &str) -> Request<Body> {
    upload_request(csv, "inventory.csv", "text/csv")
}

/// Multipart request whose only field is a plain text value
pub fn upload_without_file() -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"note\"\r\n\
         \r\n\
         hello\r\n\
         --{BOUNDARY}--\r\n"
    );

    Request::builder()
        .method("POST")
        .uri("/api/inventory/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub async fn extract_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
