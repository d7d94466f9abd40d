//! Inventory repository
//!
//! Find-or-create operations keyed on each entity's natural key. Every lookup
//! is a guarded insert (`ON CONFLICT DO NOTHING` against the unique
//! constraint) followed by a select on the same key, so concurrent identical
//! ingestions cannot create duplicates. The functions take a connection so the
//! reconciler can run a whole record inside one transaction.

use bookstore_common::db::{Author, Book, Store, StoreBook};
use bookstore_common::Result;
use sqlx::SqliteConnection;

/// An entity resolved by natural key
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub entity: T,
    /// True when this call inserted the row
    pub created: bool,
}

/// Find store by (name, address), creating it if absent
pub async fn find_or_create_store(
    conn: &mut SqliteConnection,
    name: &str,
    address: &str,
) -> Result<Resolved<Store>> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO stores (name, address, created_at, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(name, address) DO NOTHING
        "#,
    )
    .bind(name)
    .bind(address)
    .execute(&mut *conn)
    .await?;

    let store = sqlx::query_as::<_, Store>(
        r#"
        SELECT id, name, address, created_at, updated_at
        FROM stores
        WHERE name = ? AND address = ?
        "#,
    )
    .bind(name)
    .bind(address)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Resolved {
        entity: store,
        created: inserted.rows_affected() == 1,
    })
}

/// Find author by exact name, creating it if absent
pub async fn find_or_create_author(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Resolved<Author>> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO authors (name, created_at, updated_at)
        VALUES (?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(name)
    .execute(&mut *conn)
    .await?;

    let author = sqlx::query_as::<_, Author>(
        "SELECT id, name, created_at, updated_at FROM authors WHERE name = ?",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Resolved {
        entity: author,
        created: inserted.rows_affected() == 1,
    })
}

/// Find book by (name, pages, author_id), creating it if absent
pub async fn find_or_create_book(
    conn: &mut SqliteConnection,
    name: &str,
    pages: i64,
    author_id: i64,
) -> Result<Resolved<Book>> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO books (name, pages, author_id, created_at, updated_at)
        VALUES (?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(name, pages, author_id) DO NOTHING
        "#,
    )
    .bind(name)
    .bind(pages)
    .bind(author_id)
    .execute(&mut *conn)
    .await?;

    let book = sqlx::query_as::<_, Book>(
        r#"
        SELECT id, name, pages, author_id, created_at, updated_at
        FROM books
        WHERE name = ? AND pages = ? AND author_id = ?
        "#,
    )
    .bind(name)
    .bind(pages)
    .bind(author_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(Resolved {
        entity: book,
        created: inserted.rows_affected() == 1,
    })
}

/// Create the (store, book) holding with one copy, or add a copy to it
///
/// A single `INSERT ... ON CONFLICT DO UPDATE` so two concurrent ingestions
/// of the same pair cannot lose an increment. The price always takes the
/// incoming value. Copies start at 1 and only ever grow, so the row was
/// created by this call exactly when it comes back with one copy.
pub async fn find_or_create_or_increment_store_book(
    conn: &mut SqliteConnection,
    store_id: i64,
    book_id: i64,
    price: f64,
) -> Result<Resolved<StoreBook>> {
    let store_book = sqlx::query_as::<_, StoreBook>(
        r#"
        INSERT INTO store_books (store_id, book_id, price, copies, sold_out, created_at, updated_at)
        VALUES (?, ?, ?, 1, 0, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        ON CONFLICT(store_id, book_id) DO UPDATE SET
            copies = store_books.copies + 1,
            price = excluded.price,
            updated_at = CURRENT_TIMESTAMP
        RETURNING id, store_id, book_id, price, copies, sold_out, created_at, updated_at
        "#,
    )
    .bind(store_id)
    .bind(book_id)
    .bind(round_to_cents(price))
    .fetch_one(&mut *conn)
    .await?;

    let created = store_book.copies == 1;
    Ok(Resolved {
        entity: store_book,
        created,
    })
}

/// Currency values are persisted with two decimals
pub fn round_to_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_common::db::init_in_memory;

    #[tokio::test]
    async fn test_store_lookup_is_idempotent() {
        let pool = init_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let first = find_or_create_store(&mut conn, "Corner Books", "1 Main St")
            .await
            .unwrap();
        let second = find_or_create_store(&mut conn, "Corner Books", "1 Main St")
            .await
            .unwrap();
        let other = find_or_create_store(&mut conn, "Corner Books", "9 Side St")
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.entity.id, second.entity.id);
        assert!(other.created);
        assert_ne!(other.entity.id, first.entity.id);
    }

    #[tokio::test]
    async fn test_book_key_includes_pages_and_author() {
        let pool = init_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let ann = find_or_create_author(&mut conn, "Ann").await.unwrap().entity;
        let bob = find_or_create_author(&mut conn, "Bob").await.unwrap().entity;

        let a = find_or_create_book(&mut conn, "Tales", 100, ann.id).await.unwrap();
        let same = find_or_create_book(&mut conn, "Tales", 100, ann.id).await.unwrap();
        let longer = find_or_create_book(&mut conn, "Tales", 120, ann.id).await.unwrap();
        let other_author = find_or_create_book(&mut conn, "Tales", 100, bob.id).await.unwrap();

        assert_eq!(a.entity.id, same.entity.id);
        assert!(!same.created);
        assert!(longer.created);
        assert!(other_author.created);
    }

    #[tokio::test]
    async fn test_store_book_increments_and_takes_latest_price() {
        let pool = init_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let store = find_or_create_store(&mut conn, "S", "A").await.unwrap().entity;
        let author = find_or_create_author(&mut conn, "Ann").await.unwrap().entity;
        let book = find_or_create_book(&mut conn, "Tales", 100, author.id)
            .await
            .unwrap()
            .entity;

        let first = find_or_create_or_increment_store_book(&mut conn, store.id, book.id, 10.0)
            .await
            .unwrap();
        assert!(first.created);
        assert_eq!(first.entity.copies, 1);
        assert!(!first.entity.sold_out);

        let second = find_or_create_or_increment_store_book(&mut conn, store.id, book.id, 12.346)
            .await
            .unwrap();
        assert!(!second.created);
        assert_eq!(second.entity.id, first.entity.id);
        assert_eq!(second.entity.copies, 2);
        assert_eq!(second.entity.price, 12.35);
    }

    #[tokio::test]
    async fn test_store_book_rejects_unknown_foreign_keys() {
        let pool = init_in_memory().await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let result = find_or_create_or_increment_store_book(&mut conn, 41, 42, 1.0).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(9.999), 10.0);
        assert_eq!(round_to_cents(25.5), 25.5);
        assert_eq!(round_to_cents(0.0), 0.0);
    }
}
