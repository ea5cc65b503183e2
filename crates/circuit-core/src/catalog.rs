//! # Catalog Lookup & Discount Rule Store
//!
//! Read-only interfaces to the data the pricing engine consumes.
//!
//! ## Collaborator Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  price_cart(cart, products, discounts)                                 │
//! │       │                 │          │                                    │
//! │       │                 ▼          ▼                                    │
//! │       │      ProductCatalog   DiscountRuleStore   ◄── traits (here)    │
//! │       │            │                  │                                 │
//! │       │            ├── InMemoryCatalog (tests, pricer store file)      │
//! │       │            ├── closures  |id| -> Result<...>                   │
//! │       │            └── anything else the host application provides     │
//! │                                                                         │
//! │  The engine never reaches for global state: every read goes through    │
//! │  one of these two traits.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use crate::error::{LookupError, ValidationError};
use crate::types::{DiscountRule, DiscountRuleId, Product, ProductId};
use crate::validation::{validate_discount_rule, validate_product, ValidationResult};

// =============================================================================
// Traits
// =============================================================================

/// Read-only access to product identity and price.
pub trait ProductCatalog {
    /// Returns the product, `Ok(None)` if it does not exist, or an error if
    /// the catalog could not be asked.
    fn get_product(&self, id: &ProductId) -> Result<Option<Product>, LookupError>;
}

/// Read-only access to discount rules indexed by target product.
pub trait DiscountRuleStore {
    /// Returns the enabled rules whose target is `product`, possibly none.
    fn find_enabled_by_target(&self, product: &ProductId)
        -> Result<Vec<DiscountRule>, LookupError>;
}

impl<F> ProductCatalog for F
where
    F: Fn(&ProductId) -> Result<Option<Product>, LookupError>,
{
    fn get_product(&self, id: &ProductId) -> Result<Option<Product>, LookupError> {
        self(id)
    }
}

impl<F> DiscountRuleStore for F
where
    F: Fn(&ProductId) -> Result<Vec<DiscountRule>, LookupError>,
{
    fn find_enabled_by_target(
        &self,
        product: &ProductId,
    ) -> Result<Vec<DiscountRule>, LookupError> {
        self(product)
    }
}

// =============================================================================
// In-Memory Catalog
// =============================================================================

/// Products and discount rules held in memory.
///
/// Implements both lookup traits. Everything entering it is validated, and
/// rules must reference products that are already present.
///
/// ## Usage
/// ```rust
/// use circuit_core::catalog::{DiscountRuleStore, InMemoryCatalog};
/// use circuit_core::{DiscountRule, DiscountValue, Money, Percentage, Product, ProductId};
///
/// let mut catalog = InMemoryCatalog::new();
/// catalog.insert_product(Product::new("a", "Mouse", Money::from_cents(1199))).unwrap();
/// catalog
///     .insert_rule(DiscountRule::new(
///         "half-second",
///         "a",
///         1,
///         "a",
///         DiscountValue::Percentage(Percentage::from_whole(50)),
///     ))
///     .unwrap();
///
/// let rules = catalog.find_enabled_by_target(&ProductId::from("a")).unwrap();
/// assert_eq!(rules.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: BTreeMap<ProductId, Product>,
    rules: BTreeMap<DiscountRuleId, DiscountRule>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product, returning the previous one.
    pub fn insert_product(&mut self, product: Product) -> ValidationResult<Option<Product>> {
        validate_product(&product)?;
        Ok(self.products.insert(product.id.clone(), product))
    }

    /// Inserts a discount rule.
    ///
    /// ## Errors
    /// - Invalid ids or value (see [`validate_discount_rule`])
    /// - A rule with the same id already exists
    /// - The required or target product is not in the catalog
    pub fn insert_rule(&mut self, rule: DiscountRule) -> ValidationResult<()> {
        validate_discount_rule(&rule)?;

        if self.rules.contains_key(&rule.id) {
            return Err(ValidationError::Duplicate {
                field: "discount id".to_string(),
                value: rule.id.to_string(),
            });
        }

        for (field, product) in [
            ("requiredProduct", &rule.required_product),
            ("targetProduct", &rule.target_product),
        ] {
            if !self.products.contains_key(product) {
                return Err(ValidationError::InvalidFormat {
                    field: field.to_string(),
                    reason: format!("unknown product '{}'", product),
                });
            }
        }

        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    /// Returns a product by id.
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    /// Iterates products ordered by id.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Iterates all rules, enabled or not, ordered by id.
    pub fn rules(&self) -> impl Iterator<Item = &DiscountRule> {
        self.rules.values()
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn get_product(&self, id: &ProductId) -> Result<Option<Product>, LookupError> {
        Ok(self.products.get(id).cloned())
    }
}

impl DiscountRuleStore for InMemoryCatalog {
    fn find_enabled_by_target(
        &self,
        product: &ProductId,
    ) -> Result<Vec<DiscountRule>, LookupError> {
        Ok(self
            .rules
            .values()
            .filter(|rule| rule.targets(product))
            .cloned()
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{DiscountValue, Percentage};

    fn catalog() -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog
            .insert_product(Product::new("a", "Mouse", Money::from_cents(1199)))
            .unwrap();
        catalog
            .insert_product(Product::new("b", "Keyboard", Money::from_cents(2999)))
            .unwrap();
        catalog
    }

    fn pct_rule(id: &str, required: &str, target: &str) -> DiscountRule {
        DiscountRule::new(
            id,
            required,
            1,
            target,
            DiscountValue::Percentage(Percentage::from_whole(10)),
        )
    }

    #[test]
    fn test_get_product() {
        let catalog = catalog();
        let found = catalog.get_product(&ProductId::from("a")).unwrap();
        assert_eq!(found.map(|p| p.name), Some("Mouse".to_string()));
        assert!(catalog.get_product(&ProductId::from("zz")).unwrap().is_none());
    }

    #[test]
    fn test_find_enabled_filters_target_and_enabled() {
        let mut catalog = catalog();
        catalog.insert_rule(pct_rule("r1", "a", "a")).unwrap();
        catalog.insert_rule(pct_rule("r2", "b", "a")).unwrap();
        catalog.insert_rule(pct_rule("r3", "a", "b")).unwrap();
        catalog
            .insert_rule(pct_rule("r4", "a", "a").disabled())
            .unwrap();

        let rules = catalog.find_enabled_by_target(&ProductId::from("a")).unwrap();
        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(catalog.rules().count(), 4);
    }

    #[test]
    fn test_insert_rule_rejects_unknown_products_and_duplicates() {
        let mut catalog = catalog();
        assert!(catalog.insert_rule(pct_rule("r1", "a", "nope")).is_err());
        assert!(catalog.insert_rule(pct_rule("r1", "nope", "a")).is_err());

        catalog.insert_rule(pct_rule("r1", "a", "a")).unwrap();
        assert!(matches!(
            catalog.insert_rule(pct_rule("r1", "b", "b")),
            Err(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_insert_product_validates() {
        let mut catalog = InMemoryCatalog::new();
        let free = Product::new("gift", "Gift card sleeve", Money::zero());
        assert!(catalog.insert_product(free).is_ok());

        let negative = Product::new("bad", "Broken", Money::from_cents(-1));
        assert!(catalog.insert_product(negative).is_err());
    }

    #[test]
    fn test_closures_are_stores() {
        let products = |id: &ProductId| -> Result<Option<Product>, LookupError> {
            Ok(Some(Product::new(id.clone(), "Anything", Money::from_cents(100))))
        };
        let rules = |_: &ProductId| -> Result<Vec<DiscountRule>, LookupError> {
            Err(LookupError::unavailable("discount store", "offline"))
        };

        assert!(products.get_product(&ProductId::from("x")).unwrap().is_some());
        assert!(rules.find_enabled_by_target(&ProductId::from("x")).is_err());
    }
}
