//! # Cart Pricing Engine
//!
//! Turns a cart into totals.
//!
//! ## Pricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  for each line item                                                     │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │ 1. unit price   ◄── ProductCatalog   (missing / down → abort)     │ │
//! │  │ 2. subtotal     = unit price × quantity                            │ │
//! │  │ 3. rules        ◄── DiscountRuleStore (down → warn, no rules)      │ │
//! │  │ 4. best rule    = best_discount(...)                               │ │
//! │  │ 5. discount     = clamp(best amount, 0, subtotal)                  │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! │                              │                                          │
//! │                              ▼                                          │
//! │  total    = Σ subtotal                                                  │
//! │  discount = Σ discount           (0 ≤ discount ≤ total)                 │
//! │  final    = total - discount                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each line is priced on its own and the results are summed, so nothing is
//! accumulated across lines while rules are evaluated. Every product and sum
//! is checked: an amount `Money` cannot hold fails pricing with
//! [`CoreError::AmountOverflow`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::cart::{Cart, LineItem};
use crate::catalog::{DiscountRuleStore, ProductCatalog};
use crate::discount::best_discount;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartId, DiscountRule, DiscountRuleId, LineItemId, ProductId};

// =============================================================================
// Results
// =============================================================================

/// Pricing of a single line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItemPricing {
    pub line_item_id: LineItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
    /// `unit_price × quantity`
    pub subtotal: Money,
    /// Best rule amount, clamped to `0..=subtotal`.
    pub discount: Money,
    /// The winning rule, absent when no rule applied.
    pub applied_rule_id: Option<DiscountRuleId>,
    /// `subtotal - discount`
    pub line_total: Money,
}

/// Priced cart.
///
/// ## Invariants
/// - `final_amount == total_amount - discount_amount`
/// - `0 ≤ discount_amount ≤ total_amount`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingResult {
    pub cart_id: CartId,
    pub items: Vec<LineItemPricing>,
    pub total_amount: Money,
    pub discount_amount: Money,
    pub final_amount: Money,
}

impl PricingResult {
    /// Sums priced lines into a result.
    fn from_lines(cart_id: CartId, items: Vec<LineItemPricing>) -> CoreResult<Self> {
        let overflow = || CoreError::overflow(format!("cart {}", cart_id));

        let total_amount =
            Money::checked_sum(items.iter().map(|line| line.subtotal)).ok_or_else(overflow)?;
        let discount_amount =
            Money::checked_sum(items.iter().map(|line| line.discount)).ok_or_else(overflow)?;
        let final_amount = total_amount
            .checked_sub(discount_amount)
            .ok_or_else(overflow)?;

        Ok(PricingResult {
            cart_id,
            items,
            total_amount,
            discount_amount,
            final_amount,
        })
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Prices a cart against a catalog and a discount rule store.
///
/// ## Errors
/// - [`CoreError::ProductNotFound`] if a line's product is not in the catalog
/// - [`CoreError::Lookup`] if the catalog cannot be reached
/// - [`CoreError::AmountOverflow`] if a subtotal, discount or total is out
///   of range
///
/// A failing rule store is not an error: the affected line gets no discount.
///
/// ## Example
/// ```rust
/// use circuit_core::catalog::InMemoryCatalog;
/// use circuit_core::{price_cart, Cart, DiscountRule, DiscountValue, Money, Percentage, Product};
///
/// let mut catalog = InMemoryCatalog::new();
/// let mouse = Product::new("mouse", "Wireless Mouse", Money::from_cents(1199));
/// let keyboard = Product::new("keyboard", "Keyboard", Money::from_cents(2999));
/// catalog.insert_product(mouse.clone()).unwrap();
/// catalog.insert_product(keyboard.clone()).unwrap();
/// catalog
///     .insert_rule(DiscountRule::new(
///         "second-mouse-half-off",
///         "mouse",
///         1,
///         "mouse",
///         DiscountValue::Percentage(Percentage::from_whole(50)),
///     ))
///     .unwrap();
///
/// let mut cart = Cart::new("c1");
/// cart.add_item(&mouse, 2).unwrap();
/// cart.add_item(&keyboard, 1).unwrap();
///
/// let result = price_cart(&cart, &catalog, &catalog).unwrap();
/// assert_eq!(result.total_amount.to_string(), "$53.97");
/// assert_eq!(result.discount_amount.to_string(), "$5.995");
/// assert_eq!(result.final_amount.to_string(), "$47.975");
/// ```
pub fn price_cart<P, D>(cart: &Cart, products: &P, discounts: &D) -> CoreResult<PricingResult>
where
    P: ProductCatalog + ?Sized,
    D: DiscountRuleStore + ?Sized,
{
    let items = cart
        .items()
        .iter()
        .map(|item| price_line(item, cart, products, discounts))
        .collect::<CoreResult<Vec<_>>>()?;

    let result = PricingResult::from_lines(cart.id().clone(), items)?;

    debug!(
        cart_id = %result.cart_id,
        lines = result.items.len(),
        total = %result.total_amount,
        discount = %result.discount_amount,
        "Priced cart"
    );

    Ok(result)
}

fn price_line<P, D>(
    item: &LineItem,
    cart: &Cart,
    products: &P,
    discounts: &D,
) -> CoreResult<LineItemPricing>
where
    P: ProductCatalog + ?Sized,
    D: DiscountRuleStore + ?Sized,
{
    let product = products
        .get_product(&item.product_id)?
        .ok_or_else(|| CoreError::ProductNotFound(item.product_id.to_string()))?;

    let overflow = || CoreError::overflow(&item.product_id);

    let unit_price = product.price();
    let subtotal = unit_price
        .checked_mul_quantity(item.quantity)
        .ok_or_else(overflow)?;

    let rules = rules_for(&item.product_id, discounts);
    let best = best_discount(item, unit_price, cart, &rules)?
        .map(|candidate| {
            let discount = candidate.amount.min(subtotal).max(Money::zero());
            (discount, candidate.rule)
        })
        .filter(|(discount, _)| discount.is_positive());

    let (discount, applied_rule_id) = match best {
        Some((discount, rule)) => {
            debug!(
                product_id = %item.product_id,
                rule_id = %rule.id,
                kind = %rule.discount.discount_type(),
                discount = %discount,
                "Applied discount"
            );
            (discount, Some(rule.id.clone()))
        }
        None => (Money::zero(), None),
    };
    let line_total = subtotal.checked_sub(discount).ok_or_else(overflow)?;

    Ok(LineItemPricing {
        line_item_id: item.id.clone(),
        product_id: item.product_id.clone(),
        quantity: item.quantity,
        unit_price,
        subtotal,
        discount,
        applied_rule_id,
        line_total,
    })
}

/// Loads rules for one product, treating an unavailable store as "no rules".
fn rules_for<D>(product_id: &ProductId, discounts: &D) -> Vec<DiscountRule>
where
    D: DiscountRuleStore + ?Sized,
{
    match discounts.find_enabled_by_target(product_id) {
        Ok(rules) => rules,
        Err(e) => {
            warn!(
                product_id = %product_id,
                error = %e,
                "Discount lookup failed, pricing without discount"
            );
            Vec::new()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::error::LookupError;
    use crate::types::{DiscountValue, Percentage, Product};

    fn mouse() -> Product {
        Product::new("a", "Wireless Mouse", Money::from_cents(1199))
    }

    fn keyboard() -> Product {
        Product::new("b", "Mechanical Keyboard", Money::from_cents(2999))
    }

    fn half_off_second_mouse() -> DiscountRule {
        DiscountRule::new(
            "half-second",
            "a",
            1,
            "a",
            DiscountValue::Percentage(Percentage::from_whole(50)),
        )
    }

    fn fifteen_off_mouse_with_keyboard() -> DiscountRule {
        DiscountRule::new(
            "fifteen-off",
            "b",
            1,
            "a",
            DiscountValue::Amount(Money::from_cents(1500)),
        )
    }

    fn catalog(rules: Vec<DiscountRule>) -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_product(mouse()).unwrap();
        catalog.insert_product(keyboard()).unwrap();
        for rule in rules {
            catalog.insert_rule(rule).unwrap();
        }
        catalog
    }

    fn scenario_cart() -> Cart {
        let mut cart = Cart::new("cart-1");
        cart.add_item(&mouse(), 2).unwrap();
        cart.add_item(&keyboard(), 1).unwrap();
        cart
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn assert_invariants(result: &PricingResult) {
        assert_eq!(
            result.final_amount,
            result.total_amount - result.discount_amount
        );
        assert!(!result.discount_amount.is_negative());
        assert!(result.discount_amount <= result.total_amount);
        for line in &result.items {
            assert!(line.discount <= line.subtotal);
            assert_eq!(line.line_total, line.subtotal - line.discount);
        }
    }

    #[test]
    fn test_same_product_percentage_scenario() {
        let catalog = catalog(vec![half_off_second_mouse()]);
        let result = price_cart(&scenario_cart(), &catalog, &catalog).unwrap();

        assert_eq!(result.total_amount, money("53.97"));
        assert_eq!(result.discount_amount, money("5.995"));
        assert_eq!(result.final_amount, money("47.975"));

        let mouse_line = &result.items[0];
        assert_eq!(mouse_line.subtotal, money("23.98"));
        assert_eq!(mouse_line.discount, money("5.995"));
        assert_eq!(
            mouse_line.applied_rule_id,
            Some(DiscountRuleId::from("half-second"))
        );
        assert_eq!(result.items[1].applied_rule_id, None);
        assert_invariants(&result);
    }

    #[test]
    fn test_competing_rules_take_the_larger() {
        let catalog = catalog(vec![
            half_off_second_mouse(),
            fifteen_off_mouse_with_keyboard(),
        ]);
        let result = price_cart(&scenario_cart(), &catalog, &catalog).unwrap();

        assert_eq!(result.discount_amount, money("15.00"));
        assert_eq!(result.final_amount, money("38.97"));
        assert_eq!(
            result.items[0].applied_rule_id,
            Some(DiscountRuleId::from("fifteen-off"))
        );
        assert_invariants(&result);
    }

    #[test]
    fn test_discount_clamped_to_line_subtotal() {
        let huge = DiscountRule::new(
            "huge",
            "a",
            0,
            "a",
            DiscountValue::Amount(Money::from_cents(100_000)),
        );
        let catalog = catalog(vec![huge]);
        let result = price_cart(&scenario_cart(), &catalog, &catalog).unwrap();

        assert_eq!(result.items[0].discount, money("23.98"));
        assert_eq!(result.items[0].line_total, Money::zero());
        assert_eq!(result.discount_amount, money("23.98"));
        assert_eq!(result.final_amount, money("29.99"));
        assert_invariants(&result);
    }

    #[test]
    fn test_invariants_hold_across_carts() {
        let catalog = catalog(vec![
            half_off_second_mouse(),
            fifteen_off_mouse_with_keyboard(),
            DiscountRule::new(
                "keyboard-bundle",
                "a",
                3,
                "b",
                DiscountValue::Percentage(Percentage::from_whole(100)),
            ),
        ]);

        for (mice, keyboards) in [(0, 0), (1, 0), (0, 1), (2, 1), (3, 4), (7, 2)] {
            let mut cart = Cart::new("c");
            if mice > 0 {
                cart.add_item(&mouse(), mice).unwrap();
            }
            if keyboards > 0 {
                cart.add_item(&keyboard(), keyboards).unwrap();
            }
            let result = price_cart(&cart, &catalog, &catalog).unwrap();
            assert_invariants(&result);
        }
    }

    #[test]
    fn test_empty_cart_prices_to_zero() {
        let catalog = catalog(vec![]);
        let result = price_cart(&Cart::new("empty"), &catalog, &catalog).unwrap();
        assert!(result.items.is_empty());
        assert_eq!(result.total_amount, Money::zero());
        assert_eq!(result.final_amount, Money::zero());
    }

    #[test]
    fn test_missing_product_aborts() {
        let catalog = catalog(vec![]);
        let mut cart = scenario_cart();
        cart.add_item(&Product::new("ghost", "Ghost", Money::from_cents(1)), 1)
            .unwrap();

        let err = price_cart(&cart, &catalog, &catalog).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_unavailable_catalog_aborts() {
        let down = |_: &ProductId| -> Result<Option<Product>, LookupError> {
            Err(LookupError::unavailable("catalog", "timeout"))
        };
        let catalog = catalog(vec![]);

        let err = price_cart(&scenario_cart(), &down, &catalog).unwrap_err();
        assert!(matches!(err, CoreError::Lookup(_)));
    }

    #[test]
    fn test_failing_rule_store_degrades_to_no_discount() {
        let catalog = catalog(vec![half_off_second_mouse()]);
        let down = |_: &ProductId| -> Result<Vec<DiscountRule>, LookupError> {
            Err(LookupError::unavailable("discount store", "connection refused"))
        };

        let result = price_cart(&scenario_cart(), &catalog, &down).unwrap();
        assert_eq!(result.discount_amount, Money::zero());
        assert_eq!(result.final_amount, money("53.97"));
    }

    #[test]
    fn test_half_off_near_decimal_limit_is_exact() {
        let big = Product::new("big", "Big", money("2000000000000000000000000000"));
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_product(big.clone()).unwrap();
        catalog
            .insert_rule(DiscountRule::new(
                "half",
                "big",
                0,
                "big",
                DiscountValue::Percentage(Percentage::from_whole(50)),
            ))
            .unwrap();

        let mut cart = Cart::new("c");
        cart.add_item(&big, 1).unwrap();

        let result = price_cart(&cart, &catalog, &catalog).unwrap();
        assert_eq!(result.discount_amount, money("1000000000000000000000000000"));
        assert_eq!(result.final_amount, money("1000000000000000000000000000"));
        assert_invariants(&result);
    }

    #[test]
    fn test_subtotal_out_of_range_is_an_error() {
        let pricey = Product::new("pricey", "Pricey", money("100000000000000000000"));
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_product(pricey.clone()).unwrap();

        let mut cart = Cart::new("c");
        cart.add_item(&pricey, 1_000_000_000).unwrap();

        let err = price_cart(&cart, &catalog, &catalog).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { context } if context == "pricey"));
    }

    #[test]
    fn test_cart_total_out_of_range_is_an_error() {
        let price = money("50000000000000000000000000000");
        let first = Product::new("first", "First", price);
        let second = Product::new("second", "Second", price);
        let mut catalog = InMemoryCatalog::new();
        catalog.insert_product(first.clone()).unwrap();
        catalog.insert_product(second.clone()).unwrap();

        let mut cart = Cart::new("c");
        cart.add_item(&first, 1).unwrap();
        cart.add_item(&second, 1).unwrap();

        let err = price_cart(&cart, &catalog, &catalog).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { context } if context == "cart c"));
    }

    #[test]
    fn test_discount_never_negative() {
        // A catalog that skips validation and hands out a negative price
        let broken = |id: &ProductId| -> Result<Option<Product>, LookupError> {
            Ok(Some(Product::new(id.clone(), "Broken", Money::from_cents(-1000))))
        };
        let rules = catalog(vec![fifteen_off_mouse_with_keyboard()]);

        let result = price_cart(&scenario_cart(), &broken, &rules).unwrap();
        assert_eq!(result.items[0].subtotal, money("-20.00"));
        assert_eq!(result.items[0].discount, Money::zero());
        assert_eq!(result.items[0].applied_rule_id, None);
        assert_eq!(result.discount_amount, Money::zero());
        assert_eq!(result.final_amount, result.total_amount);
    }

    #[test]
    fn test_price_comes_from_catalog_at_pricing_time() {
        let mut catalog = catalog(vec![]);
        let cart = scenario_cart();

        catalog
            .insert_product(Product::new("a", "Wireless Mouse", Money::from_cents(1000)))
            .unwrap();
        let result = price_cart(&cart, &catalog, &catalog).unwrap();
        assert_eq!(result.items[0].unit_price, money("10.00"));
        assert_eq!(result.total_amount, money("49.99"));
    }

    #[test]
    fn test_result_serializes_amounts_as_strings() {
        let catalog = catalog(vec![half_off_second_mouse()]);
        let result = price_cart(&scenario_cart(), &catalog, &catalog).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["cartId"], "cart-1");
        assert_eq!(json["finalAmount"], "47.975");
        assert_eq!(json["items"][0]["appliedRuleId"], "half-second");
        assert!(json["items"][1]["appliedRuleId"].is_null());
    }
}
