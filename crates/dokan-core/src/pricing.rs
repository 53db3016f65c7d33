//! # Sale Resolution
//!
//! Decides which single promotional sale (if any) applies to a product and
//! what the customer pays.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       resolve_price(product, sales)                     │
//! │                                                                         │
//! │  live sales (pre-filtered by the sales provider)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  keep relevant:  global ─ always                                        │
//! │                  category ─ product.category_id == target               │
//! │                  product ─ product.id == target                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pick most specific:  product (3) > category (2) > global (1)           │
//! │  equal specificity → first in input order                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  final = original - round(original × bps / 10000)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A narrowly targeted sale overrides a broad one even when the broad sale's
//! percentage is larger. Discounts never stack.
//!
//! The resolver does not look at time or the enabled flag. Use
//! [`live_sales`] (or `Sale::is_live`) to build its input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DiscountRate, Product, Sale};

// =============================================================================
// Price Result
// =============================================================================

/// The effective price of one product, with the provenance of its discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceResult {
    /// Echo of the product's listed price.
    pub original_price: Money,
    /// What the customer pays.
    pub final_price: Money,
    /// Applied discount; zero when no sale matched.
    pub discount: DiscountRate,
    pub is_sale: bool,
    /// End of the winning sale, for the countdown timer.
    #[ts(as = "Option<String>")]
    pub sale_end: Option<DateTime<Utc>>,
    /// The winning sale itself.
    pub sale: Option<Sale>,
}

impl PriceResult {
    /// Result for a product with no applicable sale.
    pub fn no_discount(original_price: Money) -> Self {
        PriceResult {
            original_price,
            final_price: original_price,
            discount: DiscountRate::zero(),
            is_sale: false,
            sale_end: None,
            sale: None,
        }
    }

    /// Result for `original_price` discounted by `sale`.
    pub fn with_sale(original_price: Money, sale: &Sale) -> Self {
        let discount = sale.discount();
        PriceResult {
            original_price,
            final_price: original_price.apply_percentage_discount(discount),
            discount,
            is_sale: true,
            sale_end: sale.end_time,
            sale: Some(sale.clone()),
        }
    }

    /// Amount taken off the listed price.
    pub fn savings(&self) -> Money {
        self.original_price - self.final_price
    }

    /// Discount percentage for badges (`20.0` for 20%).
    pub fn discount_percent(&self) -> f64 {
        self.discount.percentage()
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Picks the most specific sale in `sales` that applies to `product`.
///
/// Ties between sales of the same scope go to the earliest one in `sales`.
pub fn winning_sale<'a>(product: &Product, sales: &'a [Sale]) -> Option<&'a Sale> {
    sales
        .iter()
        .filter(|sale| sale.applies_to(product))
        .fold(None::<&'a Sale>, |best, sale| match best {
            Some(current) if current.scope.priority() >= sale.scope.priority() => Some(current),
            _ => Some(sale),
        })
}

/// Computes the effective price of `product` given the currently live `sales`.
///
/// Total and pure: an empty slice yields the listed price, and neither
/// argument is modified.
///
/// ```rust
/// use chrono::Utc;
/// use dokan_core::pricing::resolve_price;
/// use dokan_core::types::{Product, Sale, SaleScope};
///
/// let now = Utc::now();
/// let product = Product {
///     id: "p-1".into(),
///     sku: "JAMDANI-01".into(),
///     name_en: "Jamdani Saree".into(),
///     name_bn: Some("জামদানি শাড়ি".into()),
///     description_en: None,
///     description_bn: None,
///     price_poisha: 100_000,
///     category_id: None,
///     stock: 4,
///     image_url: None,
///     is_active: true,
///     created_at: now,
///     updated_at: now,
/// };
/// let store_wide = Sale {
///     id: "s-1".into(),
///     title_en: "Eid Sale".into(),
///     title_bn: None,
///     scope: SaleScope::Global,
///     target_id: None,
///     discount_bps: 2000,
///     start_time: now,
///     end_time: None,
///     is_active: true,
///     created_at: now,
/// };
///
/// let price = resolve_price(&product, &[store_wide]);
/// assert!(price.is_sale);
/// assert_eq!(price.final_price.poisha(), 80_000);
/// ```
pub fn resolve_price(product: &Product, sales: &[Sale]) -> PriceResult {
    let original = product.price();
    match winning_sale(product, sales) {
        Some(sale) => PriceResult::with_sale(original, sale),
        None => PriceResult::no_discount(original),
    }
}

/// Keeps the sales that are enabled and inside their window at `now`,
/// preserving input order.
pub fn live_sales(sales: &[Sale], now: DateTime<Utc>) -> Vec<Sale> {
    sales.iter().filter(|sale| sale.is_live(now)).cloned().collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleScope;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 30, 12, 0, 0).unwrap()
    }

    fn product(id: &str, price_poisha: i64, category_id: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            sku: format!("SKU-{id}"),
            name_en: "Nakshi Kantha".to_string(),
            name_bn: Some("নকশি কাঁথা".to_string()),
            description_en: None,
            description_bn: None,
            price_poisha,
            category_id: category_id.map(str::to_string),
            stock: 10,
            image_url: None,
            is_active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn sale(id: &str, scope: SaleScope, target: Option<&str>, bps: u32) -> Sale {
        Sale {
            id: id.to_string(),
            title_en: format!("Sale {id}"),
            title_bn: None,
            scope,
            target_id: target.map(str::to_string),
            discount_bps: bps,
            start_time: now() - Duration::days(1),
            end_time: Some(now() + Duration::days(1)),
            is_active: true,
            created_at: now() - Duration::days(2),
        }
    }

    #[test]
    fn test_no_sales_returns_listed_price() {
        let p = product("p1", 100_000, Some("c1"));
        let result = resolve_price(&p, &[]);

        assert_eq!(result.final_price, p.price());
        assert_eq!(result.original_price, p.price());
        assert!(result.discount.is_zero());
        assert!(!result.is_sale);
        assert!(result.sale.is_none());
        assert!(result.sale_end.is_none());
    }

    #[test]
    fn test_global_sale_applies() {
        let p = product("p1", 100_000, None);
        let result = resolve_price(&p, &[sale("g", SaleScope::Global, None, 2000)]);

        assert!(result.is_sale);
        assert_eq!(result.final_price.poisha(), 80_000);
        assert_eq!(result.savings().poisha(), 20_000);
        assert_eq!(result.discount_percent(), 20.0);
    }

    #[test]
    fn test_product_sale_beats_larger_global_sale() {
        let p = product("p1", 100_000, Some("c1"));
        let sales = vec![
            sale("g", SaleScope::Global, None, 5000),
            sale("mine", SaleScope::Product, Some("p1"), 1000),
        ];
        let result = resolve_price(&p, &sales);

        assert_eq!(result.discount.bps(), 1000);
        assert_eq!(result.final_price.poisha(), 90_000);
        assert_eq!(result.sale.as_ref().map(|s| s.id.as_str()), Some("mine"));
    }

    #[test]
    fn test_category_sale_beats_global_regardless_of_order() {
        let p = product("p1", 50_000, Some("c1"));
        let forward = vec![
            sale("cat", SaleScope::Category, Some("c1"), 1000),
            sale("g", SaleScope::Global, None, 3000),
        ];
        let backward: Vec<Sale> = forward.iter().rev().cloned().collect();

        assert_eq!(resolve_price(&p, &forward).discount.bps(), 1000);
        assert_eq!(resolve_price(&p, &backward).discount.bps(), 1000);
    }

    #[test]
    fn test_category_sale_needs_category_id() {
        let p = product("p1", 100_000, None);
        let result = resolve_price(&p, &[sale("cat", SaleScope::Category, Some("c1"), 2000)]);
        assert!(!result.is_sale);
    }

    #[test]
    fn test_category_sale_for_other_category_ignored() {
        let p = product("p1", 100_000, Some("c2"));
        let result = resolve_price(&p, &[sale("cat", SaleScope::Category, Some("c1"), 2000)]);
        assert!(!result.is_sale);
    }

    #[test]
    fn test_other_product_sale_ignored() {
        let p = product("p1", 100_000, Some("c1"));
        let result = resolve_price(&p, &[sale("other", SaleScope::Product, Some("p2"), 2000)]);
        assert!(!result.is_sale);
        assert_eq!(result.final_price.poisha(), 100_000);
    }

    #[test]
    fn test_targetless_scoped_sale_matches_nothing() {
        let p = product("p1", 100_000, Some("c1"));
        let sales = vec![
            sale("cat", SaleScope::Category, None, 2000),
            sale("prod", SaleScope::Product, None, 2000),
        ];
        assert!(!resolve_price(&p, &sales).is_sale);
    }

    #[test]
    fn test_equal_specificity_first_wins() {
        let p = product("p1", 100_000, Some("c1"));
        let sales = vec![
            sale("first", SaleScope::Category, Some("c1"), 500),
            sale("second", SaleScope::Category, Some("c1"), 4000),
        ];
        let result = resolve_price(&p, &sales);
        assert_eq!(result.sale.as_ref().map(|s| s.id.as_str()), Some("first"));
        assert_eq!(result.discount.bps(), 500);
    }

    #[test]
    fn test_resolution_is_idempotent_and_non_mutating() {
        let p = product("p1", 12_345, Some("c1"));
        let sales = vec![
            sale("g", SaleScope::Global, None, 1250),
            sale("cat", SaleScope::Category, Some("c1"), 1500),
        ];
        let p_before = p.clone();
        let sales_before = sales.clone();

        let a = resolve_price(&p, &sales);
        let b = resolve_price(&p, &sales);

        assert_eq!(a, b);
        assert_eq!(p, p_before);
        assert_eq!(sales, sales_before);
    }

    #[test]
    fn test_sale_end_exposed_for_countdown() {
        let p = product("p1", 100_000, None);
        let g = sale("g", SaleScope::Global, None, 1000);
        let result = resolve_price(&p, std::slice::from_ref(&g));
        assert_eq!(result.sale_end, g.end_time);
    }

    #[test]
    fn test_fractional_percentage_rounds_to_poisha() {
        // 999 × 12.5% = 124.875 → 125 off
        let p = product("p1", 999, None);
        let result = resolve_price(&p, &[sale("g", SaleScope::Global, None, 1250)]);
        assert_eq!(result.final_price.poisha(), 874);
    }

    #[test]
    fn test_live_sales_filters_window_and_flag() {
        let live = sale("live", SaleScope::Global, None, 1000);

        let mut upcoming = sale("upcoming", SaleScope::Global, None, 1000);
        upcoming.start_time = now() + Duration::hours(1);

        let mut ended = sale("ended", SaleScope::Global, None, 1000);
        ended.end_time = Some(now());

        let mut disabled = sale("disabled", SaleScope::Global, None, 1000);
        disabled.is_active = false;

        let mut open_ended = sale("open", SaleScope::Global, None, 1000);
        open_ended.end_time = None;

        let filtered = live_sales(&[upcoming, live, ended, disabled, open_ended], now());
        let ids: Vec<&str> = filtered.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["live", "open"]);
    }
}
