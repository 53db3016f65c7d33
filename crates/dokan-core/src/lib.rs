//! # dokan-core: Pure Business Logic for the Dokan Storefront
//!
//! This crate contains the storefront's business rules as pure functions with
//! zero I/O dependencies. Callers pass in catalog snapshots, sale snapshots and
//! the current time.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dokan Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Rendering layer (storefront CLI / web templates)       │   │
//! │  │    product card: ~~৳1,000~~ ৳800  [-20%]  ends in 02:14:09      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ dokan-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │   money   │  │   cart    │  │  coupon   │  │   │
//! │  │   │  resolve  │  │   Money   │  │   Cart    │  │  Coupon   │  │   │
//! │  │   │  _price   │  │ Discount  │  │  Summary  │  │  rules    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          dokan-db (catalog + sales providers, orders)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pricing`] - Sale resolution (`resolve_price`) and `PriceResult`
//! - [`types`] - Catalog and promotion types (Product, Category, Sale, Order)
//! - [`money`] - Money in poisha with integer arithmetic
//! - [`cart`] - Cart contents and checkout pricing
//! - [`coupon`] - Coupon redemption rules
//! - [`wishlist`] - Saved products
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use dokan_core::money::Money;
//! use dokan_core::types::{DiscountRate, Locale};
//!
//! let price = Money::from_poisha(149_900); // ৳1,499.00
//! let sale_price = price.apply_percentage_discount(DiscountRate::from_bps(1000));
//! assert_eq!(sale_price.format(Locale::En), "৳1,349.10");
//! ```

pub mod cart;
pub mod coupon;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;
pub mod wishlist;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{price_cart, Cart, CartItem, CartLine, CartSummary, ShippingPolicy};
pub use coupon::{Coupon, CouponKind};
pub use error::{CoreError, CoreResult, CouponError, ValidationError};
pub use money::Money;
pub use pricing::{live_sales, resolve_price, winning_sale, PriceResult};
pub use types::*;
pub use wishlist::Wishlist;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct products in a single cart.
pub const MAX_CART_ITEMS: usize = 50;

/// Maximum quantity of a single product in the cart.
pub const MAX_ITEM_QUANTITY: i64 = 99;

/// Generates a new entity id (UUID v4).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
