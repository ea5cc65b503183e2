//! # Domain Types
//!
//! Core domain types read by the pricing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌──────────────────────┐   ┌─────────────────┐  │
//! │  │    Product      │   │    DiscountRule      │   │  DiscountValue  │  │
//! │  │  ─────────────  │   │  ──────────────────  │   │  ─────────────  │  │
//! │  │  id             │   │  id                  │   │  Amount(Money)  │  │
//! │  │  name           │◄──│  required_product    │   │  Percentage(%)  │  │
//! │  │  price (Money)  │◄──│  target_product      │   └─────────────────┘  │
//! │  │  created_at     │   │  required_quantity   │                        │
//! │  └─────────────────┘   │  discount ───────────┼──► DiscountValue       │
//! │                        │  enabled             │                        │
//! │                        └──────────────────────┘                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are opaque strings. Generated ids are UUID v4, but fixtures and
//! tests are free to use readable ids like `"laptop"`.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            /// Generates a fresh UUID v4 identifier.
            pub fn generate() -> Self {
                $name(Uuid::new_v4().to_string())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                $name(id)
            }
        }
    };
}

string_id!(
    /// Identifies a product in the catalog.
    ProductId
);

string_id!(
    /// Identifies a shopping cart.
    CartId
);

string_id!(
    /// Identifies one line item inside a cart.
    LineItemId
);

string_id!(
    /// Identifies a discount rule.
    DiscountRuleId
);

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Read-only for the pricing engine: a cart calculation sees one consistent
/// price per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Unit price.
    pub price: Money,

    /// When the product was created.
    #[serde(default = "Utc::now")]
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product stamped with the current time.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price,
            created_at: Utc::now(),
        }
    }

    /// Returns the unit price.
    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }
}

// =============================================================================
// Percentage
// =============================================================================

/// A percentage scalar where `50` means 50%.
///
/// Valid rule values lie in `0..=100`; see
/// [`validate_percentage`](crate::validation::validate_percentage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percentage(#[ts(type = "string")] Decimal);

impl Percentage {
    /// Creates a percentage from a whole number (`25` = 25%).
    #[inline]
    pub fn from_whole(pct: u32) -> Self {
        Percentage(Decimal::from(pct))
    }

    /// Creates a percentage from a decimal (`12.5` = 12.5%).
    #[inline]
    pub const fn from_decimal(pct: Decimal) -> Self {
        Percentage(pct)
    }

    /// Returns the scalar value.
    #[inline]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}

// =============================================================================
// Discounts
// =============================================================================

/// The two kinds of reduction a rule can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum DiscountType {
    /// A flat deduction.
    Amount,
    /// A share of the discountable units' price.
    Percentage,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountType::Amount => write!(f, "AMOUNT"),
            DiscountType::Percentage => write!(f, "PERCENTAGE"),
        }
    }
}

/// The reduction a rule grants, carrying only the value relevant to its kind.
///
/// ## Wire Format
/// ```json
/// { "type": "PERCENTAGE", "value": "50" }
/// { "type": "AMOUNT", "value": "15.00" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum DiscountValue {
    /// Flat amount off the line, regardless of how many units qualify.
    Amount(Money),
    /// Percent off each discountable unit.
    Percentage(Percentage),
}

impl DiscountValue {
    /// Returns which kind of discount this is.
    pub fn discount_type(&self) -> DiscountType {
        match self {
            DiscountValue::Amount(_) => DiscountType::Amount,
            DiscountValue::Percentage(_) => DiscountType::Percentage,
        }
    }
}

/// A conditional discount: owning `required_quantity` of `required_product`
/// reduces the price of `target_product`.
///
/// When both products are the same the rule is a "buy N, discount the rest"
/// bundle; otherwise owning the required product discounts every unit of the
/// target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountRule {
    pub id: DiscountRuleId,
    pub required_product: ProductId,
    #[serde(default)]
    pub required_quantity: u32,
    pub target_product: ProductId,
    pub discount: DiscountValue,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl DiscountRule {
    /// Creates an enabled rule.
    pub fn new(
        id: impl Into<DiscountRuleId>,
        required_product: impl Into<ProductId>,
        required_quantity: u32,
        target_product: impl Into<ProductId>,
        discount: DiscountValue,
    ) -> Self {
        DiscountRule {
            id: id.into(),
            required_product: required_product.into(),
            required_quantity,
            target_product: target_product.into(),
            discount,
            enabled: true,
        }
    }

    /// Returns the same rule with `enabled` cleared.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// True when the required and target product are the same.
    #[inline]
    pub fn is_same_product(&self) -> bool {
        self.required_product == self.target_product
    }

    /// True when the rule is enabled and discounts `product`.
    #[inline]
    pub fn targets(&self, product: &ProductId) -> bool {
        self.enabled && &self.target_product == product
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_uuids() {
        let a = LineItemId::generate();
        let b = LineItemId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_id_display_and_conversions() {
        let id = ProductId::from("laptop");
        assert_eq!(id.to_string(), "laptop");
        assert_eq!(id, ProductId::new(String::from("laptop")));
    }

    #[test]
    fn test_percentage_display() {
        assert_eq!(Percentage::from_whole(50).to_string(), "50%");
        let half = Percentage::from_decimal(Decimal::new(125, 1));
        assert_eq!(half.to_string(), "12.5%");
    }

    #[test]
    fn test_rule_kind_and_targeting() {
        let same = DiscountRule::new(
            "r1",
            "a",
            1,
            "a",
            DiscountValue::Percentage(Percentage::from_whole(50)),
        );
        assert!(same.is_same_product());
        assert!(same.targets(&ProductId::from("a")));
        assert!(!same.targets(&ProductId::from("b")));
        assert!(!same.clone().disabled().targets(&ProductId::from("a")));

        let cross = DiscountRule::new(
            "r2",
            "b",
            1,
            "a",
            DiscountValue::Amount(Money::from_cents(1500)),
        );
        assert!(!cross.is_same_product());
        assert_eq!(cross.discount.discount_type(), DiscountType::Amount);
    }

    #[test]
    fn test_discount_value_wire_format() {
        let value = DiscountValue::Percentage(Percentage::from_whole(50));
        let json = serde_json::to_value(value).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "PERCENTAGE", "value": "50" }));

        let amount: DiscountValue =
            serde_json::from_str(r#"{ "type": "AMOUNT", "value": "15.00" }"#).unwrap();
        assert_eq!(amount, DiscountValue::Amount(Money::from_cents(1500)));
    }

    #[test]
    fn test_rule_defaults_when_deserialized() {
        let rule: DiscountRule = serde_json::from_str(
            r#"{
                "id": "r1",
                "requiredProduct": "a",
                "targetProduct": "a",
                "discount": { "type": "AMOUNT", "value": "1" }
            }"#,
        )
        .unwrap();
        assert_eq!(rule.required_quantity, 0);
        assert!(rule.enabled);
    }
}
