//! # Validation Module
//!
//! Input validation for the data the pricing engine reads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Types, required fields, non-negative integer quantities           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Ids, names, prices, percentages, flat amounts                     │
//! │  └── Run when products / rules enter an in-memory catalog              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart invariants (cart.rs)                                    │
//! │  └── Positive quantities, one line per product                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use circuit_core::validation::{validate_id, validate_percentage};
//! use circuit_core::types::Percentage;
//!
//! assert!(validate_id("productId", "laptop-15").is_ok());
//! assert!(validate_percentage(Percentage::from_whole(150)).is_err());
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{DiscountRule, DiscountValue, Percentage, Product};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted identifier.
pub const MAX_ID_LENGTH: usize = 64;

/// Longest accepted product name.
pub const MAX_NAME_LENGTH: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an identifier.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_ID_LENGTH`] characters
/// - Letters, digits, hyphens and underscores only (UUIDs pass)
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_ID_LENGTH,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name: non-blank, at most [`MAX_NAME_LENGTH`] characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price. Zero is allowed (free items), negative is not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: "0".to_string(),
            max: "unbounded".to_string(),
        });
    }

    Ok(())
}

/// Validates a percentage rule value: `0..=100`.
pub fn validate_percentage(pct: Percentage) -> ValidationResult<()> {
    if pct.value() < Decimal::ZERO || pct.value() > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "percentage".to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        });
    }

    Ok(())
}

/// Validates a flat discount amount: must be positive.
pub fn validate_discount_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "discount amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates every field of a product.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_id("productId", product.id.as_str())?;
    validate_product_name(&product.name)?;
    validate_price(product.price)
}

/// Validates a discount rule's ids and value.
///
/// Whether the referenced products exist is the catalog's concern.
pub fn validate_discount_rule(rule: &DiscountRule) -> ValidationResult<()> {
    validate_id("discountId", rule.id.as_str())?;
    validate_id("requiredProduct", rule.required_product.as_str())?;
    validate_id("targetProduct", rule.target_product.as_str())?;

    match rule.discount {
        DiscountValue::Amount(amount) => validate_discount_amount(amount),
        DiscountValue::Percentage(pct) => validate_percentage(pct),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
