//! Report queries

use bookstore_common::db::Store;
use bookstore_common::Result;
use sqlx::{FromRow, SqliteConnection};

/// One in-stock holding of a store, joined with its book and author
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Holding {
    pub store_book_id: i64,
    pub book_id: i64,
    pub book_name: String,
    pub author_id: i64,
    pub author_name: String,
    pub price: f64,
    pub copies: i64,
}

/// Load store by primary key
pub async fn load_store(conn: &mut SqliteConnection, store_id: i64) -> Result<Option<Store>> {
    let store = sqlx::query_as::<_, Store>(
        "SELECT id, name, address, created_at, updated_at FROM stores WHERE id = ?",
    )
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(store)
}

/// Load every holding of the store that is not sold out
///
/// Rows come back in insertion order, which is the tie-break order for the
/// rankings built on top of them.
pub async fn load_in_stock_holdings(
    conn: &mut SqliteConnection,
    store_id: i64,
) -> Result<Vec<Holding>> {
    let holdings = sqlx::query_as::<_, Holding>(
        r#"
        SELECT sb.id AS store_book_id,
               b.id AS book_id,
               b.name AS book_name,
               a.id AS author_id,
               a.name AS author_name,
               sb.price AS price,
               sb.copies AS copies
        FROM store_books sb
        JOIN books b ON b.id = sb.book_id
        JOIN authors a ON a.id = b.author_id
        WHERE sb.store_id = ? AND sb.sold_out = 0
        ORDER BY sb.id
        "#,
    )
    .bind(store_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(holdings)
}
