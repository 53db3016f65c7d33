//! # Category Repository
//!
//! Catalog categories. Category sales target `categories.id`, the storefront
//! filters by `slug`.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use dokan_core::validation::validate_product_name;
use dokan_core::Category;

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - slug already taken
    pub async fn insert(&self, category: &Category) -> DbResult<Category> {
        let mut conn = self.pool.acquire().await?;
        insert_in(&mut conn, category).await
    }

    /// Lists all categories by English name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name_en, name_bn, slug, created_at
            FROM categories
            ORDER BY name_en
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by its URL slug.
    pub async fn get_by_slug(&self, slug: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name_en, name_bn, slug, created_at
            FROM categories
            WHERE slug = ?1
            "#,
        )
        .bind(slug.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }
}

/// [`CategoryRepository::insert`] on an explicit connection.
pub(crate) async fn insert_in(
    conn: &mut SqliteConnection,
    category: &Category,
) -> DbResult<Category> {
    validate_product_name(&category.name_en)?;
    debug!(slug = %category.slug, "Inserting category");

    sqlx::query(
        r#"
        INSERT INTO categories (id, name_en, name_bn, slug, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&category.id)
    .bind(&category.name_en)
    .bind(&category.name_bn)
    .bind(&category.slug)
    .bind(category.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &category.slug),
        other => other,
    })?;

    Ok(category.clone())
}
