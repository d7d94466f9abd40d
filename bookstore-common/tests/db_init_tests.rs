//! Integration tests for database initialization
//!
//! Tests cover:
//! - Automatic database and parent directory creation
//! - Idempotent re-initialization of an existing database
//! - Declared uniqueness and check constraints

use bookstore_common::db::init_database;
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn setup_file_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("nested").join("bookstore.db");
    let pool = init_database(&db_path).await.expect("Failed to init database");
    (temp_dir, pool)
}

#[tokio::test]
async fn test_init_creates_directory_and_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("data").join("bookstore.db");
    assert!(!db_path.exists());

    let pool = init_database(&db_path).await.expect("Failed to init database");

    assert!(db_path.exists());
    pool.close().await;
}

#[tokio::test]
async fn test_reopen_preserves_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("bookstore.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("INSERT INTO stores (name, address) VALUES ('Corner Books', '1 Main St')")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.expect("Reopen should succeed");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_store_natural_key_is_unique() {
    let (_dir, pool) = setup_file_db().await;

    sqlx::query("INSERT INTO stores (name, address) VALUES ('A', 'X')")
        .execute(&pool)
        .await
        .unwrap();
    let duplicate = sqlx::query("INSERT INTO stores (name, address) VALUES ('A', 'X')")
        .execute(&pool)
        .await;
    assert!(duplicate.is_err(), "Duplicate (name, address) should be rejected");

    // Same name at another address is a different store
    sqlx::query("INSERT INTO stores (name, address) VALUES ('A', 'Y')")
        .execute(&pool)
        .await
        .expect("Different address should be accepted");
}

#[tokio::test]
async fn test_store_book_pair_is_unique_and_price_non_negative() {
    let (_dir, pool) = setup_file_db().await;

    sqlx::query("INSERT INTO stores (name, address) VALUES ('A', 'X')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO authors (name) VALUES ('Ann')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO books (name, pages, author_id) VALUES ('Dune', 412, 1)")
        .execute(&pool)
        .await
        .unwrap();

    sqlx::query("INSERT INTO store_books (store_id, book_id, price, copies) VALUES (1, 1, 9.99, 1)")
        .execute(&pool)
        .await
        .unwrap();

    let duplicate =
        sqlx::query("INSERT INTO store_books (store_id, book_id, price, copies) VALUES (1, 1, 5.00, 1)")
            .execute(&pool)
            .await;
    assert!(duplicate.is_err());

    let negative = sqlx::query("UPDATE store_books SET price = -1 WHERE id = 1")
        .execute(&pool)
        .await;
    assert!(negative.is_err());
}

#[tokio::test]
async fn test_store_book_holds_at_least_one_copy() {
    let (_dir, pool) = setup_file_db().await;

    sqlx::query("INSERT INTO stores (name, address) VALUES ('A', 'X')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO authors (name) VALUES ('Ann')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO books (name, pages, author_id) VALUES ('Dune', 412, 1)")
        .execute(&pool)
        .await
        .unwrap();

    let empty = sqlx::query("INSERT INTO store_books (store_id, book_id, price, copies) VALUES (1, 1, 9.99, 0)")
        .execute(&pool)
        .await;
    assert!(empty.is_err(), "A holding with zero copies must be rejected");

    sqlx::query("INSERT INTO store_books (store_id, book_id, price) VALUES (1, 1, 9.99)")
        .execute(&pool)
        .await
        .unwrap();
    let copies: i64 = sqlx::query_scalar("SELECT copies FROM store_books")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(copies, 1);
}

#[tokio::test]
async fn test_foreign_keys_enforced() {
    let (_dir, pool) = setup_file_db().await;

    let orphan = sqlx::query("INSERT INTO books (name, pages, author_id) VALUES ('Orphan', 10, 999)")
        .execute(&pool)
        .await;
    assert!(orphan.is_err(), "Book referencing a missing author should be rejected");
}

#[tokio::test]
async fn test_book_pages_must_be_positive() {
    let (_dir, pool) = setup_file_db().await;

    sqlx::query("INSERT INTO authors (name) VALUES ('Ann')")
        .execute(&pool)
        .await
        .unwrap();
    let zero_pages = sqlx::query("INSERT INTO books (name, pages, author_id) VALUES ('Empty', 0, 1)")
        .execute(&pool)
        .await;
    assert!(zero_pages.is_err());
}
