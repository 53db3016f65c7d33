//! # Cart
//!
//! Shopping cart contents and checkout pricing.
//!
//! ## Pricing Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart { product_id, quantity }                                          │
//! │       │                                                                 │
//! │       ▼  look up Product snapshot, check stock                          │
//! │  resolve_price(product, live sales)  ──►  CartLine.price                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal = Σ final × qty        savings = Σ (original - final) × qty   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  coupon.discount_for(subtotal)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  shipping (waived above threshold)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total = subtotal - coupon + shipping                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart only stores ids and quantities. Prices are recomputed from fresh
//! catalog and sale snapshots every time, so an ended flash sale never leaks
//! into checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::coupon::Coupon;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{resolve_price, PriceResult};
use crate::types::{Product, Sale};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Contents
// =============================================================================

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i64,
}

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding the same product increases quantity)
/// - Quantity is always in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` distinct products
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `quantity` of a product, merging with an existing line.
    pub fn add_item(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        check_quantity(quantity)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            let new_qty = item.quantity + quantity;
            check_quantity(new_qty)?;
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem {
            product_id: product_id.to_string(),
            quantity,
        });
        Ok(())
    }

    /// Sets the quantity of a line; zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }
        check_quantity(quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return Err(CoreError::NotInCart(product_id.to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines (the cart badge number).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

fn check_quantity(quantity: i64) -> CoreResult<()> {
    if quantity <= 0 {
        return Err(crate::error::ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Shipping
// =============================================================================

/// Flat-rate delivery charge with an optional free-delivery threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingPolicy {
    pub flat_fee: Money,
    /// Subtotals at or above this ship free.
    pub free_threshold: Option<Money>,
}

impl ShippingPolicy {
    pub const fn free() -> Self {
        ShippingPolicy {
            flat_fee: Money::zero(),
            free_threshold: None,
        }
    }

    pub fn fee_for(&self, subtotal: Money) -> Money {
        match self.free_threshold {
            Some(threshold) if subtotal >= threshold => Money::zero(),
            _ => self.flat_fee,
        }
    }
}

impl Default for ShippingPolicy {
    /// ৳60 delivery, free from ৳2,000.
    fn default() -> Self {
        ShippingPolicy {
            flat_fee: Money::from_poisha(6_000),
            free_threshold: Some(Money::from_poisha(200_000)),
        }
    }
}

// =============================================================================
// Cart Pricing
// =============================================================================

/// A priced cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
    pub price: PriceResult,
    pub line_total: Money,
}

/// Everything the checkout page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
    pub savings: Money,
    pub coupon_code: Option<String>,
    pub coupon_discount: Money,
    pub shipping: Money,
    pub total: Money,
}

/// Prices `cart` against catalog and live sale snapshots.
///
/// `sales` must already be filtered to live sales (see
/// [`live_sales`](crate::pricing::live_sales)); `now` is only used for the
/// coupon window.
pub fn price_cart(
    cart: &Cart,
    products: &[Product],
    sales: &[Sale],
    coupon: Option<&Coupon>,
    shipping: &ShippingPolicy,
    now: DateTime<Utc>,
) -> CoreResult<CartSummary> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(cart.items.len());
    for item in &cart.items {
        let product = products
            .iter()
            .find(|p| p.id == item.product_id)
            .ok_or_else(|| CoreError::ProductNotFound(item.product_id.clone()))?;

        if !product.is_active {
            return Err(CoreError::ProductUnavailable(product.id.clone()));
        }
        if !product.in_stock(item.quantity) {
            return Err(CoreError::InsufficientStock {
                sku: product.sku.clone(),
                available: product.stock,
                requested: item.quantity,
            });
        }

        let price = resolve_price(product, sales);
        let line_total = price.final_price.multiply_quantity(item.quantity);
        lines.push(CartLine {
            product: product.clone(),
            quantity: item.quantity,
            price,
            line_total,
        });
    }

    let subtotal: Money = lines.iter().map(|l| l.line_total).sum();
    let savings: Money = lines
        .iter()
        .map(|l| l.price.savings().multiply_quantity(l.quantity))
        .sum();

    let coupon_discount = match coupon {
        Some(c) => c.discount_for(subtotal, now)?,
        None => Money::zero(),
    };
    let shipping_fee = shipping.fee_for(subtotal);

    Ok(CartSummary {
        lines,
        subtotal,
        savings,
        coupon_code: coupon.map(|c| c.code.clone()),
        coupon_discount,
        shipping: shipping_fee,
        total: subtotal - coupon_discount + shipping_fee,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
