//! # Seed Fixtures
//!
//! A bilingual demo catalog loaded from JSON. Fixture files reference
//! categories by slug and products by SKU, and give sale windows relative to
//! the moment of seeding, so a freshly seeded store always has something on
//! sale.
//!
//! ```text
//! fixtures/catalog.json ──serde_json──► CatalogFixture ──apply(db, now)──► SQLite
//! ```
//!
//! `apply` runs in one transaction: a fixture that fails leaves the database
//! as it was.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::{category, coupon, product, promotion};
use dokan_core::{new_id, Category, Coupon, CouponKind, Product, Sale, SaleScope, ValidationError};

/// The catalog bundled with the crate.
pub const DEMO_CATALOG: &str = include_str!("../fixtures/catalog.json");

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub categories: Vec<CategoryFixture>,
    #[serde(default)]
    pub products: Vec<ProductFixture>,
    #[serde(default)]
    pub sales: Vec<SaleFixture>,
    #[serde(default)]
    pub coupons: Vec<CouponFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryFixture {
    pub slug: String,
    pub name_en: String,
    pub name_bn: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductFixture {
    pub sku: String,
    pub name_en: String,
    pub name_bn: Option<String>,
    pub description_en: Option<String>,
    pub description_bn: Option<String>,
    pub price_poisha: i64,
    /// Category slug.
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaleFixture {
    pub title_en: String,
    pub title_bn: Option<String>,
    pub scope: SaleScope,
    /// Category slug or product SKU, depending on scope.
    pub target: Option<String>,
    pub discount_bps: u32,
    /// Offset from seeding time; negative means already running.
    #[serde(default)]
    pub starts_in_hours: i64,
    /// Open-ended when absent.
    pub duration_hours: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CouponFixture {
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    #[serde(default)]
    pub min_order_poisha: i64,
    pub max_uses: Option<i64>,
    /// Never expires when absent.
    pub valid_days: Option<i64>,
}

/// What [`CatalogFixture::apply`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub products: usize,
    pub sales: usize,
    pub coupons: usize,
}

impl CatalogFixture {
    /// Parses a fixture document.
    pub fn from_json(json: &str) -> DbResult<Self> {
        serde_json::from_str(json).map_err(|e| DbError::Internal(format!("bad fixture: {e}")))
    }

    /// The bundled demo catalog.
    pub fn demo() -> DbResult<Self> {
        Self::from_json(DEMO_CATALOG)
    }

    /// Inserts every fixture, resolving slugs and SKUs to ids.
    ///
    /// All or nothing: on error no fixture is stored.
    pub async fn apply(&self, db: &Database, now: DateTime<Utc>) -> DbResult<SeedReport> {
        let mut report = SeedReport::default();
        let mut tx = db.pool().begin().await?;

        let mut category_ids: HashMap<&str, String> = HashMap::new();
        for fixture in &self.categories {
            let category = Category {
                id: new_id(),
                name_en: fixture.name_en.clone(),
                name_bn: fixture.name_bn.clone(),
                slug: fixture.slug.clone(),
                created_at: now,
            };
            category::insert_in(&mut tx, &category).await?;
            category_ids.insert(fixture.slug.as_str(), category.id);
            report.categories += 1;
        }

        let mut product_ids: HashMap<&str, String> = HashMap::new();
        for fixture in &self.products {
            let category_id = match &fixture.category {
                Some(slug) => Some(lookup(&category_ids, "Category", slug)?),
                None => None,
            };
            let product = Product {
                id: new_id(),
                sku: fixture.sku.clone(),
                name_en: fixture.name_en.clone(),
                name_bn: fixture.name_bn.clone(),
                description_en: fixture.description_en.clone(),
                description_bn: fixture.description_bn.clone(),
                price_poisha: fixture.price_poisha,
                category_id,
                stock: fixture.stock,
                image_url: fixture.image_url.clone(),
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            product::insert_in(&mut tx, &product).await?;
            product_ids.insert(fixture.sku.as_str(), product.id);
            report.products += 1;
        }

        // Later fixtures count as newer, which decides equal-scope ties
        for (index, fixture) in self.sales.iter().enumerate() {
            let target_id = match (fixture.scope, &fixture.target) {
                (SaleScope::Category, Some(slug)) => Some(lookup(&category_ids, "Category", slug)?),
                (SaleScope::Product, Some(sku)) => Some(lookup(&product_ids, "Product", sku)?),
                (SaleScope::Global, Some(_)) => {
                    return Err(ValidationError::NotAllowed {
                        field: "target".to_string(),
                        reason: format!("global sale '{}' applies to every product", fixture.title_en),
                    }
                    .into())
                }
                (_, None) => None,
            };
            let start_time = now + Duration::hours(fixture.starts_in_hours);
            let sale = Sale {
                id: new_id(),
                title_en: fixture.title_en.clone(),
                title_bn: fixture.title_bn.clone(),
                scope: fixture.scope,
                target_id,
                discount_bps: fixture.discount_bps,
                start_time,
                end_time: fixture.duration_hours.map(|h| start_time + Duration::hours(h)),
                is_active: true,
                created_at: now + Duration::seconds(index as i64),
            };
            promotion::insert_in(&mut tx, &sale).await?;
            report.sales += 1;
        }

        for fixture in &self.coupons {
            let coupon = Coupon {
                code: fixture.code.clone(),
                kind: fixture.kind,
                value: fixture.value,
                min_order_poisha: fixture.min_order_poisha,
                max_uses: fixture.max_uses,
                used_count: 0,
                starts_at: now,
                expires_at: fixture.valid_days.map(|d| now + Duration::days(d)),
                is_active: true,
            };
            coupon::insert_in(&mut tx, &coupon).await?;
            report.coupons += 1;
        }

        tx.commit().await?;

        info!(?report, "Seeded catalog");
        Ok(report)
    }
}

fn lookup(ids: &HashMap<&str, String>, entity: &str, key: &str) -> DbResult<String> {
    ids.get(key)
        .cloned()
        .ok_or_else(|| DbError::not_found(entity, key))
}
