//! # Coupons
//!
//! Checkout codes applied to the cart subtotal after sale pricing.
//!
//! ## Redemption Checks (in order)
//! ```text
//! is_active? ──no──► Inactive
//!     │
//! starts_at <= now? ──no──► NotStarted
//!     │
//! expires_at > now? ──no──► Expired
//!     │
//! used_count < max_uses? ──no──► UsageExhausted
//!     │
//! subtotal >= min_order? ──no──► BelowMinimum
//!     │
//!     ▼
//! discount (never more than the subtotal)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CouponError;
use crate::money::Money;
use crate::types::DiscountRate;

/// How a coupon's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// `value` is basis points off the subtotal.
    Percentage,
    /// `value` is poisha off the subtotal.
    Fixed,
}

/// A redeemable checkout code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    /// Upper-case code, e.g. `EID25`.
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    pub min_order_poisha: i64,
    /// Unlimited when absent.
    pub max_uses: Option<i64>,
    pub used_count: i64,
    #[ts(as = "String")]
    pub starts_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Coupon {
    /// Canonical form used for storage and lookups.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Checks every redemption rule except the minimum order.
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> Result<(), CouponError> {
        if !self.is_active {
            return Err(CouponError::Inactive);
        }
        if self.starts_at > now {
            return Err(CouponError::NotStarted);
        }
        if matches!(self.expires_at, Some(expires) if expires <= now) {
            return Err(CouponError::Expired);
        }
        if matches!(self.max_uses, Some(max) if self.used_count >= max) {
            return Err(CouponError::UsageExhausted);
        }
        Ok(())
    }

    /// Discount this coupon grants on `subtotal` at `now`.
    ///
    /// ```rust
    /// use chrono::Utc;
    /// use dokan_core::coupon::{Coupon, CouponKind};
    /// use dokan_core::money::Money;
    ///
    /// let coupon = Coupon {
    ///     code: "EID10".into(),
    ///     kind: CouponKind::Percentage,
    ///     value: 1000,
    ///     min_order_poisha: 0,
    ///     max_uses: None,
    ///     used_count: 0,
    ///     starts_at: Utc::now(),
    ///     expires_at: None,
    ///     is_active: true,
    /// };
    /// let off = coupon.discount_for(Money::from_poisha(50_000), Utc::now()).unwrap();
    /// assert_eq!(off.poisha(), 5_000);
    /// ```
    pub fn discount_for(&self, subtotal: Money, now: DateTime<Utc>) -> Result<Money, CouponError> {
        self.check_redeemable(now)?;

        let minimum = Money::from_poisha(self.min_order_poisha);
        if subtotal < minimum {
            return Err(CouponError::BelowMinimum { minimum });
        }

        let discount = match self.kind {
            CouponKind::Percentage => {
                let bps = self.value.clamp(0, DiscountRate::MAX_BPS as i64) as u32;
                subtotal.percentage_of(DiscountRate::from_bps(bps))
            }
            CouponKind::Fixed => Money::from_poisha(self.value.max(0)),
        };

        Ok(discount.min(subtotal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
    }

    fn coupon(kind: CouponKind, value: i64) -> Coupon {
        Coupon {
            code: "BOISHAKH".to_string(),
            kind,
            value,
            min_order_poisha: 0,
            max_uses: None,
            used_count: 0,
            starts_at: now() - Duration::days(1),
            expires_at: Some(now() + Duration::days(1)),
            is_active: true,
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(Coupon::normalize_code("  eid25 "), "EID25");
    }

    #[test]
    fn test_percentage_coupon() {
        let c = coupon(CouponKind::Percentage, 1500);
        let off = c.discount_for(Money::from_poisha(200_000), now()).unwrap();
        assert_eq!(off.poisha(), 30_000);
    }

    #[test]
    fn test_fixed_coupon_capped_at_subtotal() {
        let c = coupon(CouponKind::Fixed, 50_000);
        let off = c.discount_for(Money::from_poisha(30_000), now()).unwrap();
        assert_eq!(off.poisha(), 30_000);
    }

    #[test]
    fn test_minimum_order() {
        let mut c = coupon(CouponKind::Fixed, 10_000);
        c.min_order_poisha = 100_000;
        assert_eq!(
            c.discount_for(Money::from_poisha(99_999), now()),
            Err(CouponError::BelowMinimum {
                minimum: Money::from_poisha(100_000)
            })
        );
        assert!(c.discount_for(Money::from_poisha(100_000), now()).is_ok());
    }

    #[test]
    fn test_window_and_flags() {
        let mut c = coupon(CouponKind::Fixed, 100);
        c.is_active = false;
        assert_eq!(c.check_redeemable(now()), Err(CouponError::Inactive));

        let mut c = coupon(CouponKind::Fixed, 100);
        c.starts_at = now() + Duration::minutes(1);
        assert_eq!(c.check_redeemable(now()), Err(CouponError::NotStarted));

        let mut c = coupon(CouponKind::Fixed, 100);
        c.expires_at = Some(now());
        assert_eq!(c.check_redeemable(now()), Err(CouponError::Expired));

        let mut c = coupon(CouponKind::Fixed, 100);
        c.max_uses = Some(3);
        c.used_count = 3;
        assert_eq!(c.check_redeemable(now()), Err(CouponError::UsageExhausted));
    }
}
