//! # Storefront Service
//!
//! Joins the catalog provider and the sales provider, and hands each product
//! to the price resolver. This is what product cards and the product page
//! consume.
//!
//! ## Data Flow
//! ```text
//! ProductRepository ──► Vec<Product> ─┐
//!                                     ├──► resolve_price(p, &live) ──► PricedProduct
//! PromotionRepository::live_at(now) ──┘      (once per product)
//! ```
//!
//! Live sales are fetched once per call and shared by every product in it, so
//! a page of 24 cards costs two queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::category::CategoryRepository;
use crate::repository::product::ProductRepository;
use crate::repository::promotion::PromotionRepository;
use dokan_core::{resolve_price, PriceResult, Product, Sale};

/// A product together with what it costs right now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedProduct {
    pub product: Product,
    pub price: PriceResult,
}

impl PricedProduct {
    fn price_all(products: Vec<Product>, sales: &[Sale]) -> Vec<PricedProduct> {
        products
            .into_iter()
            .map(|product| {
                let price = resolve_price(&product, sales);
                PricedProduct { product, price }
            })
            .collect()
    }
}

/// Read-side service for product listings.
#[derive(Debug, Clone)]
pub struct Storefront {
    categories: CategoryRepository,
    products: ProductRepository,
    promotions: PromotionRepository,
}

impl Storefront {
    pub fn new(pool: SqlitePool) -> Self {
        Storefront {
            categories: CategoryRepository::new(pool.clone()),
            products: ProductRepository::new(pool.clone()),
            promotions: PromotionRepository::new(pool),
        }
    }

    /// Active products, optionally limited to one category slug, with prices
    /// resolved at `now`.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - the category slug does not exist
    pub async fn priced_catalog(
        &self,
        category_slug: Option<&str>,
        limit: u32,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<PricedProduct>> {
        let products = match category_slug {
            Some(slug) => {
                let category = self
                    .categories
                    .get_by_slug(slug)
                    .await?
                    .ok_or_else(|| DbError::not_found("Category", slug))?;
                self.products.list_by_category(&category.id, limit).await?
            }
            None => self.products.list_active(limit).await?,
        };

        let sales = self.promotions.live_at(now).await?;
        debug!(products = products.len(), sales = sales.len(), "Pricing catalog");

        Ok(PricedProduct::price_all(products, &sales))
    }

    /// One product with its price at `now`. Hidden products are not found.
    pub async fn priced_product(&self, id: &str, now: DateTime<Utc>) -> DbResult<PricedProduct> {
        let product = self
            .products
            .get_by_id(id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let sales = self.promotions.live_at(now).await?;
        let price = resolve_price(&product, &sales);

        Ok(PricedProduct { product, price })
    }

    /// Search results with prices at `now`.
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<PricedProduct>> {
        let products = self.products.search(query, limit).await?;
        let sales = self.promotions.live_at(now).await?;

        Ok(PricedProduct::price_all(products, &sales))
    }

    /// Sales running at `now`, newest first. Feeds the sales banner.
    pub async fn live_sales(&self, now: DateTime<Utc>) -> DbResult<Vec<Sale>> {
        self.promotions.live_at(now).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{self, now};
    use chrono::Duration;
    use dokan_core::SaleScope;

    #[tokio::test]
    async fn test_most_specific_sale_wins_across_catalog() {
        let db = fixtures::database().await;
        let sarees = fixtures::category("sarees", "Sarees", None);
        db.categories().insert(&sarees).await.unwrap();

        let jamdani = fixtures::product("SR-1", 100_000, Some(&sarees.id));
        let katan = fixtures::product("SR-2", 100_000, Some(&sarees.id));
        let tea = fixtures::product("TEA-1", 100_000, None);
        for p in [&jamdani, &katan, &tea] {
            db.products().insert(p).await.unwrap();
        }

        let promos = db.promotions();
        promos
            .insert(&fixtures::sale(SaleScope::Global, None, 1000))
            .await
            .unwrap();
        promos
            .insert(&fixtures::sale(SaleScope::Category, Some(&sarees.id), 2000))
            .await
            .unwrap();
        promos
            .insert(&fixtures::sale(SaleScope::Product, Some(&jamdani.id), 3000))
            .await
            .unwrap();

        let storefront = db.storefront();
        let cards = storefront.priced_catalog(None, 10, now()).await.unwrap();
        let final_of = |id: &str| {
            cards
                .iter()
                .find(|c| c.product.id == id)
                .map(|c| c.price.final_price.poisha())
                .unwrap()
        };

        assert_eq!(final_of(&jamdani.id), 70_000);
        assert_eq!(final_of(&katan.id), 80_000);
        assert_eq!(final_of(&tea.id), 90_000);

        let sarees_only = storefront
            .priced_catalog(Some("sarees"), 10, now())
            .await
            .unwrap();
        assert_eq!(sarees_only.len(), 2);

        assert!(matches!(
            storefront.priced_catalog(Some("shoes"), 10, now()).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_equal_scope_tie_goes_to_newest_sale() {
        let db = fixtures::database().await;
        let sarees = fixtures::category("sarees", "Sarees", None);
        db.categories().insert(&sarees).await.unwrap();
        let saree = fixtures::product("SR-1", 100_000, Some(&sarees.id));
        db.products().insert(&saree).await.unwrap();

        let mut older = fixtures::sale(SaleScope::Category, Some(&sarees.id), 4000);
        older.created_at = now() - Duration::days(5);
        let mut newer = fixtures::sale(SaleScope::Category, Some(&sarees.id), 1500);
        newer.created_at = now() - Duration::days(2);
        db.promotions().insert(&older).await.unwrap();
        db.promotions().insert(&newer).await.unwrap();

        let card = db.storefront().priced_product(&saree.id, now()).await.unwrap();
        assert_eq!(card.price.sale.map(|s| s.id), Some(newer.id));
        assert_eq!(card.price.final_price.poisha(), 85_000);
    }

    #[tokio::test]
    async fn test_prices_follow_the_clock() {
        let db = fixtures::database().await;
        let tea = fixtures::product("TEA-1", 35_000, None);
        db.products().insert(&tea).await.unwrap();
        db.promotions()
            .insert(&fixtures::sale(SaleScope::Product, Some(&tea.id), 2000))
            .await
            .unwrap();

        let storefront = db.storefront();

        let during = storefront.priced_product(&tea.id, now()).await.unwrap();
        assert!(during.price.is_sale);
        assert_eq!(during.price.sale_end, Some(now() + Duration::hours(5)));

        let after = storefront
            .priced_product(&tea.id, now() + Duration::hours(5))
            .await
            .unwrap();
        assert!(!after.price.is_sale);
        assert_eq!(after.price.final_price, after.price.original_price);

        let found = storefront.search("tea", 10, now()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].price.is_sale);

        assert_eq!(storefront.live_sales(now()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_hidden_product_not_found() {
        let db = fixtures::database().await;
        let tea = fixtures::product("TEA-1", 35_000, None);
        db.products().insert(&tea).await.unwrap();
        db.products().soft_delete(&tea.id).await.unwrap();

        assert!(matches!(
            db.storefront().priced_product(&tea.id, now()).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
