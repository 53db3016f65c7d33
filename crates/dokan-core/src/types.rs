//! # Domain Types
//!
//! Core domain types used throughout the Dokan storefront.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │    Product      │   │      Sale       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  category_id    │   │  scope          │       │
//! │  │  name_en/bn     │   │  price_poisha   │   │  target_id      │       │
//! │  │  slug           │   │  name_en/bn     │   │  discount_bps   │       │
//! │  └─────────────────┘   └─────────────────┘   │  start/end      │       │
//! │                                               └─────────────────┘       │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │   SaleScope     │   │     Locale      │       │
//! │  │  bps (u32)      │   │  Global (1)     │   │  En             │       │
//! │  │  2000 = 20%     │   │  Category (2)   │   │  Bn             │       │
//! │  └─────────────────┘   │  Product (3)    │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All catalog text is bilingual: English is mandatory, Bangla is optional and
//! falls back to English when missing.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Locale
// =============================================================================

/// Storefront display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Bn,
}

impl Locale {
    /// Short language code (`en` / `bn`).
    pub const fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Bn => "bn",
        }
    }

    /// Picks the localized text, falling back to English.
    pub fn pick<'a>(&self, en: &'a str, bn: Option<&'a str>) -> &'a str {
        match (self, bn) {
            (Locale::Bn, Some(bn)) if !bn.trim().is_empty() => bn,
            _ => en,
        }
    }
}

impl FromStr for Locale {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "bn" | "bangla" | "bengali" => Ok(Locale::Bn),
            other => Err(ValidationError::InvalidFormat {
                field: "locale".to_string(),
                reason: format!("unsupported locale '{other}', expected en or bn"),
            }),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount percentage represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 2000 bps = 20% and 1250 bps = 12.5%.
/// Valid range is 0..=10000.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Upper bound: 100%.
    pub const MAX_BPS: u32 = 10_000;

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a percentage (for admin input convenience).
    pub fn from_percentage(pct: f64) -> Self {
        DiscountRate((pct * 100.0).round().clamp(0.0, Self::MAX_BPS as f64) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u32> for DiscountRate {
    type Error = ValidationError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        if bps > Self::MAX_BPS {
            return Err(ValidationError::OutOfRange {
                field: "discount_bps".to_string(),
                min: 0,
                max: Self::MAX_BPS as i64,
            });
        }
        Ok(DiscountRate(bps))
    }
}

/// Badge text: `20%`, `12.5%`.
impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}%", self.percentage())
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A catalog category (e.g. "Sarees" / "শাড়ি").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name_en: String,
    pub name_bn: Option<String>,
    /// URL slug used for filtering (`/category/sarees`).
    pub slug: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn display_name(&self, locale: Locale) -> &str {
        locale.pick(&self.name_en, self.name_bn.as_deref())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product listed in the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    pub name_en: String,
    pub name_bn: Option<String>,
    pub description_en: Option<String>,
    pub description_bn: Option<String>,

    /// Listed price in poisha.
    pub price_poisha: i64,

    /// Category foreign key; uncategorised products never match category sales.
    pub category_id: Option<String>,

    /// Units on hand.
    pub stock: i64,

    pub image_url: Option<String>,

    /// Whether the product is published (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the listed price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_poisha(self.price_poisha)
    }

    pub fn display_name(&self, locale: Locale) -> &str {
        locale.pick(&self.name_en, self.name_bn.as_deref())
    }

    pub fn description(&self, locale: Locale) -> Option<&str> {
        match &self.description_en {
            Some(en) => Some(locale.pick(en, self.description_bn.as_deref())),
            None => self.description_bn.as_deref(),
        }
    }

    /// Checks whether `quantity` units can be sold right now.
    pub fn in_stock(&self, quantity: i64) -> bool {
        self.is_active && self.stock >= quantity
    }
}

// =============================================================================
// Sale Scope
// =============================================================================

/// Which products a sale applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleScope {
    /// Every product in the store.
    Global,
    /// Products whose `category_id` equals the sale's target.
    Category,
    /// Exactly the product whose id equals the sale's target.
    Product,
}

impl SaleScope {
    /// Specificity used to pick a single winning sale: higher wins.
    pub const fn priority(&self) -> u8 {
        match self {
            SaleScope::Global => 1,
            SaleScope::Category => 2,
            SaleScope::Product => 3,
        }
    }

    /// Whether sales of this scope carry a target id.
    pub const fn requires_target(&self) -> bool {
        !matches!(self, SaleScope::Global)
    }
}

impl fmt::Display for SaleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SaleScope::Global => "global",
            SaleScope::Category => "category",
            SaleScope::Product => "product",
        })
    }
}

impl FromStr for SaleScope {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(SaleScope::Global),
            "category" => Ok(SaleScope::Category),
            "product" => Ok(SaleScope::Product),
            other => Err(ValidationError::InvalidFormat {
                field: "scope".to_string(),
                reason: format!("unknown sale scope '{other}'"),
            }),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A time-bounded promotional campaign (flash sale, category sale, store-wide sale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub title_en: String,
    pub title_bn: Option<String>,
    pub scope: SaleScope,
    /// Category or product id; `None` for global sales.
    pub target_id: Option<String>,
    /// Discount in basis points (2000 = 20%).
    pub discount_bps: u32,
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,
    /// Open-ended when absent.
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,
    /// Admin on/off switch, independent of the time window.
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn discount(&self) -> DiscountRate {
        DiscountRate::from_bps(self.discount_bps)
    }

    pub fn title(&self, locale: Locale) -> &str {
        locale.pick(&self.title_en, self.title_bn.as_deref())
    }

    /// Checks whether this sale targets `product` (ignores the time window).
    pub fn applies_to(&self, product: &Product) -> bool {
        match self.scope {
            SaleScope::Global => true,
            SaleScope::Category => match (&product.category_id, &self.target_id) {
                (Some(category), Some(target)) => category == target,
                _ => false,
            },
            SaleScope::Product => self.target_id.as_deref() == Some(product.id.as_str()),
        }
    }

    /// Enabled and inside its window at `now`.
    ///
    /// The window is half-open: `start_time <= now < end_time`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || self.start_time > now {
            return false;
        }
        match self.end_time {
            Some(end) => end > now,
            None => true,
        }
    }

    /// Countdown for the sale badge; `None` for open-ended or finished sales.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let end = self.end_time?;
        if end > now {
            Some(end - now)
        } else {
            None
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Lifecycle of a placed order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting fulfilment.
    #[default]
    Pending,
    /// Cancelled; stock has been returned.
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Cancelled => "cancelled",
        })
    }
}

/// A checked-out cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub status: OrderStatus,
    /// Sum of sale-adjusted line totals.
    pub subtotal_poisha: i64,
    /// What sales saved the customer relative to listed prices.
    pub savings_poisha: i64,
    pub coupon_code: Option<String>,
    pub coupon_discount_poisha: i64,
    pub shipping_poisha: i64,
    pub total_poisha: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_poisha(self.total_poisha)
    }
}

/// A line of an order, snapshotting the price the customer actually paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// SKU at time of checkout (frozen).
    pub sku_snapshot: String,
    /// English name at time of checkout (frozen).
    pub name_snapshot: String,
    /// Bangla name at time of checkout (frozen).
    pub name_bn_snapshot: Option<String>,
    pub original_price_poisha: i64,
    pub unit_price_poisha: i64,
    pub discount_bps: u32,
    /// Winning sale, if any.
    pub sale_id: Option<String>,
    pub quantity: i64,
    pub line_total_poisha: i64,
}

impl OrderItem {
    /// Name as it read at checkout, in `locale`.
    pub fn display_name(&self, locale: Locale) -> &str {
        locale.pick(&self.name_snapshot, self.name_bn_snapshot.as_deref())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
