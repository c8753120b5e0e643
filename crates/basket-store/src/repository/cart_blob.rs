//! # Cart Blob Repository
//!
//! Key-value access to the `cart_blobs` table.
//!
//! ## Table Layout
//! ```text
//! ┌──────────────────┬──────────────────────────┬──────────────────────────┐
//! │ cart_id (PK)     │ data                     │ updated_at               │
//! ├──────────────────┼──────────────────────────┼──────────────────────────┤
//! │ "checkout-1"     │ {"id":"checkout-1",...}  │ 2026-01-01T10:00:00Z     │
//! └──────────────────┴──────────────────────────┴──────────────────────────┘
//! ```
//!
//! Writes are upserts: one row per cart, the last writer wins.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for cart blob operations.
#[derive(Debug, Clone)]
pub struct CartBlobRepository {
    pool: SqlitePool,
}

impl CartBlobRepository {
    /// Creates a new CartBlobRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartBlobRepository { pool }
    }

    /// Returns the stored blob, or `None` when the cart has never been saved.
    pub async fn get(&self, cart_id: &str) -> DbResult<Option<String>> {
        let data = sqlx::query_scalar::<_, String>(
            r#"
            SELECT data FROM cart_blobs
            WHERE cart_id = ?1
            "#,
        )
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(data)
    }

    /// Inserts or replaces the blob for a cart.
    pub async fn put(&self, cart_id: &str, data: &str) -> DbResult<()> {
        let now = Utc::now();

        debug!(cart_id = %cart_id, bytes = data.len(), "Writing cart blob");

        sqlx::query(
            r#"
            INSERT INTO cart_blobs (cart_id, data, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(cart_id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(cart_id)
        .bind(data)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes the blob for a cart. Deleting a missing row is not an error.
    ///
    /// ## Returns
    /// Whether a row was removed.
    pub async fn delete(&self, cart_id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cart_blobs WHERE cart_id = ?1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        debug!(
            cart_id = %cart_id,
            removed = result.rows_affected(),
            "Deleted cart blob"
        );

        Ok(result.rows_affected() > 0)
    }

    /// Whether a blob exists for the cart.
    pub async fn exists(&self, cart_id: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_blobs WHERE cart_id = ?1")
            .bind(cart_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
