//! # Validation Module
//!
//! Input validation for catalog, promotion and checkout data.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Web form (TypeScript)    → immediate feedback                 │
//! │  Layer 2: THIS MODULE              → business rules                     │
//! │  Layer 3: SQLite                   → NOT NULL / UNIQUE / FK / CHECK     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use dokan_core::validation::{validate_sku, validate_quantity};
//!
//! assert!(validate_sku("JAMDANI-01").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use chrono::{DateTime, Utc};

use crate::coupon::CouponKind;
use crate::error::ValidationError;
use crate::types::{DiscountRate, SaleScope};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Not empty, at most 50 characters
/// - Only ASCII letters, digits, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product or category name in either language.
///
/// Length is counted in characters, not bytes, so Bangla names get the
/// same 200-character allowance as English ones.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_display_text("name", name)
}

/// Validates a sale title in either language.
pub fn validate_sale_title(title: &str) -> ValidationResult<()> {
    validate_display_text("title", title)
}

fn validate_display_text(field: &str, text: &str) -> ValidationResult<()> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if text.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates and trims a catalog search query (empty is allowed).
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a coupon code: 3-32 ASCII letters or digits.
pub fn validate_coupon_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "coupon code".to_string(),
        });
    }

    if code.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "coupon code".to_string(),
            max: 32,
        });
    }

    if code.len() < 3 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "coupon code".to_string(),
            reason: "must be 3-32 letters or digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart quantity (1..=MAX_ITEM_QUANTITY).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a listed price in poisha. Listed prices must be positive.
pub fn validate_price(poisha: i64) -> ValidationResult<()> {
    if poisha <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a discount in basis points (0% to 100%).
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    DiscountRate::try_from(bps).map(|_| ())
}

/// Validates a coupon's `value` for its kind.
///
/// ## Rules
/// - `percentage`: basis points in 0..=10000
/// - `fixed`: poisha, greater than zero
pub fn validate_coupon_value(kind: CouponKind, value: i64) -> ValidationResult<()> {
    match kind {
        CouponKind::Percentage => {
            let bps = u32::try_from(value).map_err(|_| ValidationError::OutOfRange {
                field: "discount_bps".to_string(),
                min: 0,
                max: DiscountRate::MAX_BPS as i64,
            })?;
            validate_discount_bps(bps)
        }
        CouponKind::Fixed => {
            if value <= 0 {
                return Err(ValidationError::MustBePositive {
                    field: "value".to_string(),
                });
            }
            Ok(())
        }
    }
}

// =============================================================================
// Sale Validators
// =============================================================================

/// Validates a sale definition before it is stored.
///
/// ## Rules
/// - `category` / `product` scopes need a target id
/// - `global` scope must not carry one
/// - discount in 0..=10000 bps
/// - end time, when present, after start time
pub fn validate_sale(
    scope: SaleScope,
    target_id: Option<&str>,
    discount_bps: u32,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    let target = target_id.map(str::trim).filter(|t| !t.is_empty());

    match (scope.requires_target(), target) {
        (true, None) => {
            return Err(ValidationError::Required {
                field: "target_id".to_string(),
            })
        }
        (false, Some(_)) => {
            return Err(ValidationError::NotAllowed {
                field: "target_id".to_string(),
                reason: "global sales apply to every product".to_string(),
            })
        }
        _ => {}
    }

    validate_discount_bps(discount_bps)?;

    if matches!(end_time, Some(end) if end <= start_time) {
        return Err(ValidationError::InvalidFormat {
            field: "end_time".to_string(),
            reason: "must be after start_time".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|e| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
