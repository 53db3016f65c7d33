//! # Product Repository
//!
//! The catalog provider: products with their listed price and category.
//!
//! ## Key Operations
//! - Catalog listing (all active, or one category)
//! - Bilingual search over SKU and English/Bangla names
//! - Price and stock updates
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Customer types: "kantha"  (or "কাঁথা")                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LIKE '%kantha%' over: sku, name_en, name_bn                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  NK-001 | Nakshi Kantha Quilt | নকশি কাঁথা   ← MATCH                     │
//! │  SR-014 | Jamdani Saree       | জামদানি শাড়ি                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Active products only, ordered by English name                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices returned here are listed prices. Sale prices come from
//! [`Storefront`](crate::storefront::Storefront).

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use dokan_core::validation::{validate_price, validate_product_name, validate_search_query, validate_sku};
use dokan_core::{CoreError, Product};

pub(crate) const PRODUCT_COLUMNS: &str = r#"
    id, sku, name_en, name_bn, description_en, description_bn,
    price_poisha, category_id, stock, image_url, is_active,
    created_at, updated_at
"#;

/// Escapes `%`, `_` and `\` so user input matches literally inside LIKE.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let results = repo.search("jamdani", 20).await?;
/// let product = repo.get_by_sku("SR-014").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::Rule)` - SKU, name or price failed validation
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    /// * `Err(DbError::ForeignKeyViolation)` - unknown category
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        let mut conn = self.pool.acquire().await?;
        insert_in(&mut conn, product).await
    }

    /// Gets a product by its ID (active or not).
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its SKU (active or not).
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists active products, ordered by English name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name_en LIMIT ?1"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists active products of one category, ordered by English name.
    pub async fn list_by_category(&self, category_id: &str, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE is_active = 1 AND category_id = ?1
            ORDER BY name_en
            LIMIT ?2
            "#
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(category_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Searches active products by SKU and name in either language.
    ///
    /// An empty query lists active products.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE is_active = 1
              AND (sku LIKE ?1 ESCAPE '\'
                   OR name_en LIKE ?1 ESCAPE '\'
                   OR name_bn LIKE ?1 ESCAPE '\')
            ORDER BY name_en
            LIMIT ?2
            "#
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(like_pattern(&query))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Changes the listed price.
    pub async fn update_price(&self, id: &str, price_poisha: i64) -> DbResult<()> {
        validate_price(price_poisha)?;
        debug!(id = %id, price_poisha, "Updating price");

        let result = sqlx::query(
            "UPDATE products SET price_poisha = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(price_poisha)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adds `delta` units to stock (negative to remove).
    ///
    /// Stock never goes below zero: a delta that would do so fails with
    /// `CoreError::InsufficientStock` and changes nothing.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<i64> {
        debug!(id = %id, delta, "Adjusting stock");

        let stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1 AND stock + ?2 >= 0
            RETURNING stock
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(stock) = stock {
            return Ok(stock);
        }

        match self.get_by_id(id).await? {
            Some(product) => Err(CoreError::InsufficientStock {
                sku: product.sku,
                available: product.stock,
                requested: -delta,
            }
            .into()),
            None => Err(DbError::not_found("Product", id)),
        }
    }

    /// Hides a product from the storefront. Past orders keep referencing it.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// [`ProductRepository::insert`] on an explicit connection.
pub(crate) async fn insert_in(conn: &mut SqliteConnection, product: &Product) -> DbResult<Product> {
    validate_sku(&product.sku)?;
    validate_product_name(&product.name_en)?;
    validate_price(product.price_poisha)?;

    debug!(sku = %product.sku, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (
            id, sku, name_en, name_bn, description_en, description_bn,
            price_poisha, category_id, stock, image_url, is_active,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&product.id)
    .bind(&product.sku)
    .bind(&product.name_en)
    .bind(&product.name_bn)
    .bind(&product.description_en)
    .bind(&product.description_bn)
    .bind(product.price_poisha)
    .bind(&product.category_id)
    .bind(product.stock)
    .bind(&product.image_url)
    .bind(product.is_active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &product.sku),
        other => other,
    })?;

    Ok(product.clone())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("শাড়ি"), "%শাড়ি%");
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = fixtures::database().await;
        let repo = db.products();

        let product = fixtures::product("SR-014", 450_000, None);
        repo.insert(&product).await.unwrap();

        let by_id = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(by_id, product);

        let by_sku = repo.get_by_sku("SR-014").await.unwrap().unwrap();
        assert_eq!(by_sku.id, product.id);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_bad_rows() {
        let db = fixtures::database().await;
        let repo = db.products();

        repo.insert(&fixtures::product("SR-014", 100, None)).await.unwrap();

        let dup = repo
            .insert(&fixtures::product("SR-014", 100, None))
            .await
            .unwrap_err();
        assert!(matches!(dup, DbError::UniqueViolation { .. }));

        let free = repo
            .insert(&fixtures::product("FREE-1", 0, None))
            .await
            .unwrap_err();
        assert!(matches!(free, DbError::Rule(CoreError::Validation(_))));

        let orphan = repo
            .insert(&fixtures::product("ORPHAN-1", 100, Some("no-such-category")))
            .await
            .unwrap_err();
        assert!(matches!(orphan, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_listing_and_category_filter() {
        let db = fixtures::database().await;
        let sarees = fixtures::category("sarees", "Sarees", None);
        db.categories().insert(&sarees).await.unwrap();

        let repo = db.products();
        let mut jamdani = fixtures::product("SR-1", 450_000, Some(&sarees.id));
        jamdani.name_en = "Jamdani Saree".to_string();
        let mut tea = fixtures::product("TEA-1", 35_000, None);
        tea.name_en = "Assam Tea".to_string();
        repo.insert(&jamdani).await.unwrap();
        repo.insert(&tea).await.unwrap();

        let all = repo.list_active(10).await.unwrap();
        assert_eq!(
            all.iter().map(|p| p.sku.as_str()).collect::<Vec<_>>(),
            vec!["TEA-1", "SR-1"]
        );

        let only_sarees = repo.list_by_category(&sarees.id, 10).await.unwrap();
        assert_eq!(only_sarees.len(), 1);
        assert_eq!(only_sarees[0].id, jamdani.id);

        assert_eq!(repo.list_active(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_search_bilingual() {
        let db = fixtures::database().await;
        let repo = db.products();

        let mut kantha = fixtures::product("NK-001", 250_000, None);
        kantha.name_en = "Nakshi Kantha Quilt".to_string();
        kantha.name_bn = Some("নকশি কাঁথা".to_string());
        repo.insert(&kantha).await.unwrap();
        repo.insert(&fixtures::product("TEA-1", 35_000, None)).await.unwrap();

        assert_eq!(repo.search("kantha", 10).await.unwrap().len(), 1);
        assert_eq!(repo.search("KANTHA", 10).await.unwrap().len(), 1);
        assert_eq!(repo.search("কাঁথা", 10).await.unwrap().len(), 1);
        assert_eq!(repo.search("nk-0", 10).await.unwrap().len(), 1);
        assert_eq!(repo.search("  ", 10).await.unwrap().len(), 2);
        assert!(repo.search("100%", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stock_price_and_soft_delete() {
        let db = fixtures::database().await;
        let repo = db.products();
        let product = fixtures::product("LG-7", 80_000, None);
        repo.insert(&product).await.unwrap();

        assert_eq!(repo.adjust_stock(&product.id, -5).await.unwrap(), 15);
        assert_eq!(repo.adjust_stock(&product.id, 10).await.unwrap(), 25);

        let err = repo.adjust_stock(&product.id, -26).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::InsufficientStock { available: 25, requested: 26, .. })
        ));

        repo.update_price(&product.id, 75_000).await.unwrap();
        let updated = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(updated.price_poisha, 75_000);
        assert_eq!(updated.stock, 25);

        assert_eq!(repo.count().await.unwrap(), 1);
        repo.soft_delete(&product.id).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.search("", 10).await.unwrap().is_empty());

        assert!(matches!(
            repo.soft_delete("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
