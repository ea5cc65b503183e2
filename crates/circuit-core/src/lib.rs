//! # circuit-core: Cart Pricing & Discount Engine
//!
//! Pure business logic for Circuit Store carts: line-item mutation, discount
//! rule evaluation and cart pricing. No I/O of any kind.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Circuit Store Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               circuit-pricer (operator CLI)                     │   │
//! │  │    create / add / remove / clear / price  ──►  JSON on stdout  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ circuit-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │  money   │  │   cart   │  │ discount │  │   pricing    │   │   │
//! │  │   │  Money   │  │   Cart   │  │  Bundle  │  │  price_cart  │   │   │
//! │  │   │          │  │ LineItem │  │ best_... │  │ PricingResult│   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────┬───────┘   │   │
//! │  │                                                     │           │   │
//! │  │   NO I/O • NO GLOBAL STATE • PURE FUNCTIONS         │           │   │
//! │  └─────────────────────────────────────────────────────┼───────────┘   │
//! │                                                        │ catalog traits │
//! │  ┌─────────────────────────────────────────────────────▼───────────┐   │
//! │  │      ProductCatalog / DiscountRuleStore implementations         │   │
//! │  │      (in-memory catalog, store file, closures, databases)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, DiscountRule, ids)
//! - [`money`] - Decimal money (no floating point!)
//! - [`cart`] - Cart and line items
//! - [`catalog`] - Read-only lookup traits and an in-memory catalog
//! - [`discount`] - Best-rule selection for one line item
//! - [`pricing`] - Cart totals
//! - [`error`] - Domain error types
//! - [`validation`] - Catalog data validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same cart, catalog and rules = same result
//! 2. **No I/O**: catalog and rules arrive through traits
//! 3. **Decimal Money**: exact sums, one rounding per percentage discount
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use circuit_core::{price_cart, Cart, InMemoryCatalog, Money, Product};
//!
//! let mut catalog = InMemoryCatalog::new();
//! let laptop = Product::new("laptop", "15\" Laptop", Money::from_cents(89999));
//! catalog.insert_product(laptop.clone()).unwrap();
//!
//! let mut cart = Cart::new("cart-1");
//! cart.add_item(&laptop, 1).unwrap();
//!
//! // No rules in the catalog: nothing is discounted
//! let result = price_cart(&cart, &catalog, &catalog).unwrap();
//! assert_eq!(result.final_amount, Money::from_cents(89999));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod discount;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use circuit_core::Money` instead of
// `use circuit_core::money::Money`

pub use cart::{Cart, LineItem, Removal};
pub use catalog::{DiscountRuleStore, InMemoryCatalog, ProductCatalog};
pub use discount::{best_discount, evaluate_rule, Bundle, DiscountCandidate};
pub use error::{CoreError, CoreResult, LookupError, ValidationError};
pub use money::{Money, MONEY_SCALE};
pub use pricing::{price_cart, LineItemPricing, PricingResult};
pub use types::*;
