//! # Wishlist Repository
//!
//! Saved products per customer. One row per `(customer_id, product_id)`.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::PRODUCT_COLUMNS;
use dokan_core::{Product, Wishlist};

/// Repository for wishlist database operations.
#[derive(Debug, Clone)]
pub struct WishlistRepository {
    pool: SqlitePool,
}

impl WishlistRepository {
    /// Creates a new WishlistRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WishlistRepository { pool }
    }

    /// Saves a product. Saving it again keeps the original `added_at`.
    pub async fn add(&self, customer_id: &str, product_id: &str) -> DbResult<()> {
        debug!(customer_id = %customer_id, product_id = %product_id, "Adding to wishlist");

        sqlx::query(
            r#"
            INSERT INTO wishlist_items (customer_id, product_id, added_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (customer_id, product_id) DO NOTHING
            "#,
        )
        .bind(customer_id)
        .bind(product_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a product. Returns whether it was saved.
    pub async fn remove(&self, customer_id: &str, product_id: &str) -> DbResult<bool> {
        debug!(customer_id = %customer_id, product_id = %product_id, "Removing from wishlist");

        let result =
            sqlx::query("DELETE FROM wishlist_items WHERE customer_id = ?1 AND product_id = ?2")
                .bind(customer_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn contains(&self, customer_id: &str, product_id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM wishlist_items WHERE customer_id = ?1 AND product_id = ?2",
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    /// The customer's wishlist, most recently saved first.
    pub async fn list(&self, customer_id: &str) -> DbResult<Wishlist> {
        let product_ids: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT product_id FROM wishlist_items
            WHERE customer_id = ?1
            ORDER BY added_at DESC, rowid DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Wishlist {
            customer_id: customer_id.to_string(),
            product_ids,
        })
    }

    /// Saved products that are still listed, most recently saved first.
    pub async fn list_products(&self, customer_id: &str) -> DbResult<Vec<Product>> {
        let columns = PRODUCT_COLUMNS
            .split(',')
            .map(|c| format!("p.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT {columns}
            FROM wishlist_items w
            INNER JOIN products p ON p.id = w.product_id
            WHERE w.customer_id = ?1 AND p.is_active = 1
            ORDER BY w.added_at DESC, w.rowid DESC
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }
}
