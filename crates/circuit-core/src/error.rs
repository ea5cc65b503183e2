//! # Error Types
//!
//! Domain-specific error types for circuit-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  circuit-core errors (this file)                                       │
//! │  ├── CoreError        - Cart and pricing failures                      │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── LookupError      - Catalog / rule store could not answer          │
//! │                                                                         │
//! │  circuit-pricer errors (app)                                           │
//! │  └── ApiError         - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError / LookupError → CoreError → ApiError → stdout   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! "No applicable discount" is never an error: it prices as zero.

use std::fmt;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart mutation and pricing errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line item references a product the catalog does not know.
    ///
    /// ## When This Occurs
    /// - Product was removed from the catalog after being added to a cart
    /// - A materialized cart was built with a stale product id
    ///
    /// Fatal for pricing: without a unit price there is no subtotal.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The cart being priced or mutated does not exist.
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// A cart add/remove was asked to move zero units.
    ///
    /// ## User Workflow
    /// ```text
    /// add laptop --quantity 0
    ///      │
    ///      ▼
    /// InvalidQuantity { requested: 0 }   (cart left untouched)
    /// ```
    #[error("Quantity must be positive, got {requested}")]
    InvalidQuantity { requested: u32 },

    /// Adding would overflow the line item's quantity.
    #[error("Quantity {current} + {requested} exceeds the maximum line quantity")]
    QuantityTooLarge { current: u32, requested: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An external store failed to answer a lookup the computation needs.
    #[error("Lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// A price, quantity or percentage produced an amount outside the range
    /// `Money` can represent.
    ///
    /// `context` names what was being computed (a product id or a cart total).
    #[error("Amount out of range while pricing {context}")]
    AmountOverflow { context: String },
}

impl CoreError {
    /// Builds a [`CoreError::AmountOverflow`] for `context`.
    pub fn overflow(context: impl fmt::Display) -> Self {
        CoreError::AmountOverflow {
            context: context.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for catalog data (products, discount rules) and for carts handed to
/// the core already materialized.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparseable decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., two line items for one product).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Lookup Error
// =============================================================================

/// Failure of an external collaborator to answer a read.
///
/// "Not found" is not a lookup error: stores answer `Ok(None)` or an empty
/// rule list for that.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The store could not be reached or answered with an error.
    #[error("{store} unavailable: {reason}")]
    Unavailable { store: String, reason: String },
}

impl LookupError {
    /// Shorthand for [`LookupError::Unavailable`].
    pub fn unavailable(store: impl Into<String>, reason: impl Into<String>) -> Self {
        LookupError::Unavailable {
            store: store.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
