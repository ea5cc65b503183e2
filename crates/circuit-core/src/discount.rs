//! # Discount Evaluator
//!
//! Picks the single best discount rule for one line item.
//!
//! ## Rule Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SameProduct { threshold: R }          "buy R, discount the rest"      │
//! │  ─────────────────────────────                                          │
//! │  item qty Q ≤ R  ──► not eligible                                      │
//! │  item qty Q > R  ──► Q - R units discountable                          │
//! │                                                                         │
//! │  CrossProduct { required, R }          "own R of X, discount all Y"    │
//! │  ─────────────────────────────                                          │
//! │  cart qty of X < R (or absent) ──► not eligible                        │
//! │  otherwise                     ──► every unit of Y discountable        │
//! │                                    (X is checked, never consumed)      │
//! │                                                                         │
//! │  Amount per rule:                                                       │
//! │    AMOUNT      flat value, never scaled by quantity                    │
//! │    PERCENTAGE  unit price × discountable qty × pct / 100               │
//! │                                                                         │
//! │  Rules compete: the largest amount wins, amounts never add up.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The evaluator does not clamp to the line subtotal; that is the pricing
//! engine's last step.

use crate::cart::{Cart, LineItem};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountRule, DiscountValue, ProductId};

// =============================================================================
// Bundle
// =============================================================================

/// How a rule decides eligibility, fixed once per rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bundle<'a> {
    /// Required and target product are the same.
    SameProduct { threshold: u32 },
    /// Owning `required_quantity` of another product unlocks the target.
    CrossProduct {
        required_product: &'a ProductId,
        required_quantity: u32,
    },
}

impl<'a> Bundle<'a> {
    /// Classifies a rule.
    pub fn of(rule: &'a DiscountRule) -> Self {
        if rule.is_same_product() {
            Bundle::SameProduct {
                threshold: rule.required_quantity,
            }
        } else {
            Bundle::CrossProduct {
                required_product: &rule.required_product,
                required_quantity: rule.required_quantity,
            }
        }
    }

    /// Units of `item` the rule may discount, or `None` if it does not apply.
    ///
    /// `cart` is only consulted for cross-product bundles.
    pub fn discountable_quantity(&self, item: &LineItem, cart: &Cart) -> Option<u32> {
        match *self {
            Bundle::SameProduct { threshold } => {
                if item.quantity <= threshold {
                    None
                } else {
                    Some(item.quantity - threshold)
                }
            }
            Bundle::CrossProduct {
                required_product,
                required_quantity,
            } => {
                let owned = cart.find_item_by_product(required_product)?;
                if owned.quantity < required_quantity {
                    None
                } else {
                    Some(item.quantity)
                }
            }
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// An applicable rule and what it would take off one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountCandidate<'a> {
    pub rule: &'a DiscountRule,
    /// Raw amount, not yet clamped to the line subtotal.
    pub amount: Money,
    pub discountable_quantity: u32,
}

/// Scores one rule against one line item.
///
/// Returns `Ok(None)` when the rule is disabled, targets another product, is
/// not eligible in this cart, or would take nothing off.
///
/// ## Errors
/// [`CoreError::AmountOverflow`] if the percentage amount is out of range.
pub fn evaluate_rule<'a>(
    rule: &'a DiscountRule,
    item: &LineItem,
    unit_price: Money,
    cart: &Cart,
) -> CoreResult<Option<DiscountCandidate<'a>>> {
    if !rule.targets(&item.product_id) {
        return Ok(None);
    }

    let Some(discountable_quantity) = Bundle::of(rule).discountable_quantity(item, cart) else {
        return Ok(None);
    };

    let amount = match rule.discount {
        DiscountValue::Amount(flat) => flat,
        DiscountValue::Percentage(pct) => unit_price
            .checked_mul_quantity(discountable_quantity)
            .and_then(|base| base.checked_percentage(pct))
            .ok_or_else(|| CoreError::overflow(&item.product_id))?,
    };

    if !amount.is_positive() {
        return Ok(None);
    }

    Ok(Some(DiscountCandidate {
        rule,
        amount,
        discountable_quantity,
    }))
}

/// Returns the rule giving the largest discount on `item`, if any applies.
///
/// On equal amounts the earlier rule is kept. An out-of-range amount from
/// any rule fails the whole evaluation.
///
/// ## Example
/// ```rust
/// use circuit_core::discount::best_discount;
/// use circuit_core::{Cart, DiscountRule, DiscountValue, Money, Percentage, Product};
///
/// let mouse = Product::new("mouse", "Wireless Mouse", Money::from_cents(1199));
/// let mut cart = Cart::new("c1");
/// cart.add_item(&mouse, 2).unwrap();
///
/// let rules = vec![
///     DiscountRule::new("half", "mouse", 1, "mouse",
///         DiscountValue::Percentage(Percentage::from_whole(50))),
///     DiscountRule::new("tenth", "mouse", 0, "mouse",
///         DiscountValue::Percentage(Percentage::from_whole(10))),
/// ];
///
/// let item = &cart.items()[0];
/// let best = best_discount(item, mouse.price, &cart, &rules).unwrap().unwrap();
/// assert_eq!(best.rule.id.as_str(), "half");
/// assert_eq!(best.amount.to_string(), "$5.995");
/// ```
pub fn best_discount<'a, I>(
    item: &LineItem,
    unit_price: Money,
    cart: &Cart,
    rules: I,
) -> CoreResult<Option<DiscountCandidate<'a>>>
where
    I: IntoIterator<Item = &'a DiscountRule>,
{
    rules
        .into_iter()
        .try_fold(None, |best: Option<DiscountCandidate<'a>>, rule| {
            let candidate = evaluate_rule(rule, item, unit_price, cart)?;
            Ok::<_, CoreError>(match (best, candidate) {
                (Some(best), Some(candidate)) if best.amount >= candidate.amount => Some(best),
                (best, None) => best,
                (_, candidate) => candidate,
            })
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
