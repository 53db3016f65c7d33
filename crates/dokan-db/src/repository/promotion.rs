//! # Promotion Repository
//!
//! The sales provider. Fetches enabled sales and narrows them to the ones
//! live at a given instant, which is the only sale set the price resolver
//! should ever see.
//!
//! ## Provider Contract
//! ```text
//! sales table
//!     │  WHERE is_active = 1
//!     │  ORDER BY created_at DESC      ← newest first
//!     ▼
//! list_enabled()
//!     │  start_time <= now < end_time  (end_time NULL = open-ended)
//!     ▼
//! live_at(now)  ──►  resolve_price(product, &sales)
//! ```
//!
//! The resolver breaks ties between sales of the same scope by input order,
//! so among equally specific sales the most recently created one wins. This
//! is an observable ordering, not a promise: callers that need a specific
//! winner should not run overlapping sales of the same scope.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use dokan_core::validation::{validate_sale, validate_sale_title};
use dokan_core::{live_sales, Sale};

const SALE_COLUMNS: &str = r#"
    id, title_en, title_bn, scope, target_id, discount_bps,
    start_time, end_time, is_active, created_at
"#;

/// Repository for sale (promotion) database operations.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Inserts a new sale after validating scope, target and window.
    pub async fn insert(&self, sale: &Sale) -> DbResult<Sale> {
        let mut conn = self.pool.acquire().await?;
        insert_in(&mut conn, sale).await
    }

    /// Turns a sale on or off without touching its window.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        info!(id = %id, active, "Toggling sale");

        let result = sqlx::query("UPDATE sales SET is_active = ?2 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }

    /// Gets a sale by id, enabled or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// All enabled sales, newest first, regardless of their window.
    pub async fn list_enabled(&self) -> DbResult<Vec<Sale>> {
        let mut conn = self.pool.acquire().await?;
        list_enabled_in(&mut conn).await
    }

    /// Enabled sales whose window contains `now`, newest first.
    pub async fn live_at(&self, now: DateTime<Utc>) -> DbResult<Vec<Sale>> {
        let enabled = self.list_enabled().await?;
        let live = live_sales(&enabled, now);

        debug!(enabled = enabled.len(), live = live.len(), "Loaded live sales");
        Ok(live)
    }
}

/// [`PromotionRepository::insert`] on an explicit connection.
pub(crate) async fn insert_in(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<Sale> {
    validate_sale_title(&sale.title_en)?;
    validate_sale(
        sale.scope,
        sale.target_id.as_deref(),
        sale.discount_bps,
        sale.start_time,
        sale.end_time,
    )?;

    info!(
        id = %sale.id,
        scope = %sale.scope,
        discount_bps = sale.discount_bps,
        "Inserting sale"
    );

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, title_en, title_bn, scope, target_id, discount_bps,
            start_time, end_time, is_active, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.title_en)
    .bind(&sale.title_bn)
    .bind(sale.scope)
    .bind(&sale.target_id)
    .bind(sale.discount_bps)
    .bind(sale.start_time)
    .bind(sale.end_time)
    .bind(sale.is_active)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(sale.clone())
}

/// [`PromotionRepository::list_enabled`] on an explicit connection, so checkout
/// prices against the same snapshot it writes.
pub(crate) async fn list_enabled_in(conn: &mut SqliteConnection) -> DbResult<Vec<Sale>> {
    let sql = format!(
        "SELECT {SALE_COLUMNS} FROM sales WHERE is_active = 1 ORDER BY created_at DESC, id"
    );
    let mut sales = sqlx::query_as::<_, Sale>(&sql)
        .fetch_all(&mut *conn)
        .await?;

    // Text timestamps only sort correctly when they share a format
    sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(sales)
}

// =============================================================================
// Unit Tests
// =============================================================================
