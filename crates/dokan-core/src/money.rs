//! # Money Module
//!
//! Provides the `Money` type for handling taka amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    1099.99 * 0.85 = 934.9914999999999  ❌                               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Poisha (1 taka = 100 poisha)                     │
//! │    109999 poisha - round(109999 * 1500 / 10000) = 93499 poisha          │
//! │    Rounding happens exactly once, at a known place                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dokan_core::money::Money;
//! use dokan_core::types::DiscountRate;
//!
//! let price = Money::from_poisha(100_000); // ৳1,000.00
//! let sale_price = price.apply_percentage_discount(DiscountRate::from_bps(2000));
//! assert_eq!(sale_price.poisha(), 80_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::{DiscountRate, Locale};

/// Taka sign used for display.
pub const TAKA_SIGN: char = '৳';

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in poisha (1/100 of a Bangladeshi taka).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for discounts and refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// Product.price_poisha ──► resolve_price() ──► PriceResult.final_price
///                                                   │
///                                                   ▼
///              CartLine.line_total ──► CartSummary.subtotal ──► Order.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from poisha (the smallest currency unit).
    ///
    /// ```rust
    /// use dokan_core::money::Money;
    ///
    /// let price = Money::from_poisha(125_050); // ৳1,250.50
    /// assert_eq!(price.poisha(), 125_050);
    /// ```
    #[inline]
    pub const fn from_poisha(poisha: i64) -> Self {
        Money(poisha)
    }

    /// Creates a Money value from taka and poisha parts.
    ///
    /// For negative amounts only the taka part should be negative:
    /// `from_taka_poisha(-5, 50)` is -৳5.50.
    #[inline]
    pub const fn from_taka_poisha(taka: i64, poisha: i64) -> Self {
        if taka < 0 {
            Money(taka * 100 - poisha)
        } else {
            Money(taka * 100 + poisha)
        }
    }

    /// Returns the value in poisha.
    #[inline]
    pub const fn poisha(&self) -> i64 {
        self.0
    }

    /// Returns the whole-taka portion (truncated toward zero).
    #[inline]
    pub const fn taka(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the poisha portion (always 0-99).
    #[inline]
    pub const fn poisha_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `rate` of this amount, rounded half up to the nearest poisha.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// i128 keeps large amounts from overflowing.
    ///
    /// ```rust
    /// use dokan_core::money::Money;
    /// use dokan_core::types::DiscountRate;
    ///
    /// let amount = Money::from_poisha(999); // ৳9.99
    /// let cut = amount.percentage_of(DiscountRate::from_bps(1250)); // 12.5%
    /// // 124.875 poisha → 125
    /// assert_eq!(cut.poisha(), 125);
    /// ```
    pub fn percentage_of(&self, rate: DiscountRate) -> Money {
        let part = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money(part as i64)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ```rust
    /// use dokan_core::money::Money;
    /// use dokan_core::types::DiscountRate;
    ///
    /// let listed = Money::from_poisha(10_000); // ৳100.00
    /// let discounted = listed.apply_percentage_discount(DiscountRate::from_bps(1000));
    /// assert_eq!(discounted.poisha(), 9_000);
    /// ```
    pub fn apply_percentage_discount(&self, rate: DiscountRate) -> Money {
        *self - self.percentage_of(rate)
    }

    /// Formats the amount for a storefront locale.
    ///
    /// English uses ASCII digits; Bangla swaps in Bengali numerals.
    ///
    /// ```rust
    /// use dokan_core::money::Money;
    /// use dokan_core::types::Locale;
    ///
    /// let price = Money::from_poisha(125_050);
    /// assert_eq!(price.format(Locale::En), "৳1,250.50");
    /// assert_eq!(price.format(Locale::Bn), "৳১,২৫০.৫০");
    /// ```
    pub fn format(&self, locale: Locale) -> String {
        let plain = self.to_string();
        match locale {
            Locale::En => plain,
            Locale::Bn => to_bangla_digits(&plain),
        }
    }
}

/// Replaces ASCII digits with Bengali numerals (০-৯), leaving other characters alone.
pub fn to_bangla_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32('০' as u32 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// Groups an unsigned digit string in thousands: `1250` → `1,250`.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays as `৳1,250.50`, or `-৳5.50` for negative amounts.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}{}.{:02}",
            sign,
            TAKA_SIGN,
            group_thousands(&self.taka().abs().to_string()),
            self.poisha_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_poisha() {
        let money = Money::from_poisha(1099);
        assert_eq!(money.poisha(), 1099);
        assert_eq!(money.taka(), 10);
        assert_eq!(money.poisha_part(), 99);
    }

    #[test]
    fn test_from_taka_poisha() {
        assert_eq!(Money::from_taka_poisha(10, 99).poisha(), 1099);
        assert_eq!(Money::from_taka_poisha(-5, 50).poisha(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_poisha(1099).to_string(), "৳10.99");
        assert_eq!(Money::from_poisha(0).to_string(), "৳0.00");
        assert_eq!(Money::from_poisha(-550).to_string(), "-৳5.50");
        assert_eq!(Money::from_poisha(123_456_789).to_string(), "৳1,234,567.89");
        assert_eq!(Money::from_poisha(100_000).to_string(), "৳1,000.00");
    }

    #[test]
    fn test_bangla_format() {
        let price = Money::from_poisha(80_000);
        assert_eq!(price.format(Locale::Bn), "৳৮০০.০০");
        assert_eq!(to_bangla_digits("-20%"), "-২০%");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_poisha(1000);
        let b = Money::from_poisha(500);

        assert_eq!((a + b).poisha(), 1500);
        assert_eq!((a - b).poisha(), 500);
        assert_eq!((a * 3).poisha(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.poisha(), 2000);
    }

    #[test]
    fn test_percentage_discount() {
        let listed = Money::from_poisha(100_000);
        let discounted = listed.apply_percentage_discount(DiscountRate::from_bps(2000));
        assert_eq!(discounted.poisha(), 80_000);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 250 * 10% = 25.0, 255 * 10% = 25.5 → 26
        assert_eq!(
            Money::from_poisha(250).percentage_of(DiscountRate::from_bps(1000)).poisha(),
            25
        );
        assert_eq!(
            Money::from_poisha(255).percentage_of(DiscountRate::from_bps(1000)).poisha(),
            26
        );
    }

    #[test]
    fn test_zero_and_full_discount() {
        let listed = Money::from_poisha(4_999);
        assert_eq!(listed.apply_percentage_discount(DiscountRate::zero()), listed);
        assert!(listed
            .apply_percentage_discount(DiscountRate::from_bps(10_000))
            .is_zero());
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_poisha(1).is_positive());
        assert!(Money::from_poisha(-1).is_negative());
        assert_eq!(Money::from_poisha(-550).abs().poisha(), 550);
    }
}
