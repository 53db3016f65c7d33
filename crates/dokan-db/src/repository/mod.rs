//! # Repository Module
//!
//! Database repository implementations for the Dokan storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLI command / web handler                                              │
//! │       │                                                                 │
//! │       │  db.promotions().live_at(now)                                   │
//! │       ▼                                                                 │
//! │  PromotionRepository                                                    │
//! │  ├── insert(&self, sale)                                                │
//! │  ├── list_enabled(&self)      ORDER BY created_at DESC                  │
//! │  └── live_at(&self, now)      enabled ∩ inside window                   │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - Catalog categories
//! - [`ProductRepository`](product::ProductRepository) - Catalog provider
//! - [`PromotionRepository`](promotion::PromotionRepository) - Sales provider
//! - [`CouponRepository`](coupon::CouponRepository) - Checkout codes
//! - [`WishlistRepository`](wishlist::WishlistRepository) - Saved products
//! - [`OrderRepository`](order::OrderRepository) - Checkout transactions

pub mod category;
pub mod coupon;
pub mod order;
pub mod product;
pub mod promotion;
pub mod wishlist;

/// Row builders shared by the repository tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use dokan_core::{new_id, Category, Coupon, CouponKind, Product, Sale, SaleScope};

    use crate::pool::{Database, DbConfig};

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 14, 12, 0, 0).unwrap()
    }

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn category(slug: &str, name_en: &str, name_bn: Option<&str>) -> Category {
        Category {
            id: new_id(),
            name_en: name_en.to_string(),
            name_bn: name_bn.map(str::to_string),
            slug: slug.to_string(),
            created_at: now(),
        }
    }

    pub fn product(sku: &str, price_poisha: i64, category_id: Option<&str>) -> Product {
        Product {
            id: new_id(),
            sku: sku.to_string(),
            name_en: format!("Product {sku}"),
            name_bn: None,
            description_en: None,
            description_bn: None,
            price_poisha,
            category_id: category_id.map(str::to_string),
            stock: 20,
            image_url: None,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    pub fn sale(scope: SaleScope, target_id: Option<&str>, discount_bps: u32) -> Sale {
        Sale {
            id: new_id(),
            title_en: format!("{scope} sale"),
            title_bn: None,
            scope,
            target_id: target_id.map(str::to_string),
            discount_bps,
            start_time: now() - Duration::hours(1),
            end_time: Some(now() + Duration::hours(5)),
            is_active: true,
            created_at: now() - Duration::days(1),
        }
    }

    pub fn coupon(code: &str, kind: CouponKind, value: i64) -> Coupon {
        Coupon {
            code: code.to_string(),
            kind,
            value,
            min_order_poisha: 0,
            max_uses: None,
            used_count: 0,
            starts_at: now() - Duration::days(7),
            expires_at: Some(now() + Duration::days(7)),
            is_active: true,
        }
    }
}
