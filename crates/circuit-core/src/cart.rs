//! # Cart Model
//!
//! The mutable line-item collection priced by [`crate::pricing`].
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operation                 Precondition        Cart Change              │
//! │  ─────────                 ────────────        ───────────              │
//! │                                                                         │
//! │  add_item(p, q) ─────────► q > 0 ────────────► existing.qty += q       │
//! │                                                 or push new item        │
//! │                                                                         │
//! │  remove_item(p, q) ──────► q > 0 ────────────► qty -= q                │
//! │                                                 qty ≤ 0 → item removed  │
//! │                                                 no item → no-op         │
//! │                                                                         │
//! │  clear() ────────────────► none ─────────────► items.clear()           │
//! │                                                                         │
//! │  find_item_by_product(p) ► none ─────────────► (read only)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line item per product (adding the same product again
//!   increases its quantity)
//! - Quantities are > 0 while an item is present
//!
//! Both are enforced by keeping `items` private: the only way in is through
//! the methods below or [`Cart::with_items`], which validates.
//!
//! ## Example
//! ```rust
//! use circuit_core::{Cart, Money, Product, Removal};
//!
//! let mouse = Product::new("mouse", "Wireless Mouse", Money::from_cents(1199));
//! let mut cart = Cart::new("cart-1");
//!
//! cart.add_item(&mouse, 1).unwrap();
//! cart.add_item(&mouse, 2).unwrap();
//! assert_eq!(cart.quantity_of(&mouse.id), 3);
//!
//! // Removing more than present removes the line instead of failing
//! assert_eq!(cart.remove_item(&mouse.id, 10).unwrap(), Removal::Removed);
//! assert!(cart.is_empty());
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CartId, LineItemId, Product, ProductId};

// =============================================================================
// Line Item
// =============================================================================

/// One product entry in a cart with its quantity.
///
/// The line references its product by id; the unit price is resolved from
/// the catalog when the cart is priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    /// Line identity. Generated when missing from serialized input.
    #[serde(default = "LineItemId::generate")]
    pub id: LineItemId,

    /// The product this line is for.
    pub product_id: ProductId,

    /// Units in the cart, always > 0 inside a [`Cart`].
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line item with a freshly generated id.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        LineItem {
            id: LineItemId::generate(),
            product_id: product_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// Removal Outcome
// =============================================================================

/// What [`Cart::remove_item`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Removal {
    /// The product had no line in the cart; nothing changed.
    NotInCart,
    /// The line's quantity was reduced.
    Decremented { remaining: u32 },
    /// The line was deleted because its quantity reached zero.
    Removed,
}

// =============================================================================
// Cart
// =============================================================================

/// A shopping cart.
///
/// Mutation takes `&mut self`, so a cart has a single writer at a time;
/// serializing writers across threads is the owner's job (see the pricer's
/// `CartState`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CartSnapshot")]
pub struct Cart {
    id: CartId,
    items: Vec<LineItem>,
    created_at: DateTime<Utc>,
}

/// Unvalidated serialized form of a [`Cart`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartSnapshot {
    id: CartId,
    #[serde(default)]
    items: Vec<LineItem>,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl TryFrom<CartSnapshot> for Cart {
    type Error = CoreError;

    fn try_from(snapshot: CartSnapshot) -> Result<Self, Self::Error> {
        let mut cart = Cart::with_items(snapshot.id, snapshot.items)?;
        cart.created_at = snapshot.created_at;
        Ok(cart)
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new(id: impl Into<CartId>) -> Self {
        Cart {
            id: id.into(),
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Builds a cart from an existing item list, checking the invariants.
    ///
    /// ## Errors
    /// - [`CoreError::InvalidQuantity`] if any item has quantity 0
    /// - [`ValidationError::Duplicate`] if two items share a product
    pub fn with_items(id: impl Into<CartId>, items: Vec<LineItem>) -> CoreResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(CoreError::InvalidQuantity { requested: 0 });
            }
            if !seen.insert(&item.product_id) {
                return Err(ValidationError::Duplicate {
                    field: "line item product".to_string(),
                    value: item.product_id.to_string(),
                }
                .into());
            }
        }

        Ok(Cart {
            id: id.into(),
            items,
            created_at: Utc::now(),
        })
    }

    /// Returns the cart id.
    pub fn id(&self) -> &CartId {
        &self.id
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// When the cart was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Adds `quantity` units of `product`.
    ///
    /// ## Behavior
    /// - If the product already has a line: its quantity increases
    /// - Otherwise: a new line is appended
    ///
    /// ## Returns
    /// The line's quantity after the add.
    ///
    /// ## Errors
    /// Zero quantity or `u32` overflow; the cart is unchanged in both cases.
    pub fn add_item(&mut self, product: &Product, quantity: u32) -> CoreResult<u32> {
        if quantity == 0 {
            return Err(CoreError::InvalidQuantity { requested: quantity });
        }

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product.id)
        {
            let new_qty = item
                .quantity
                .checked_add(quantity)
                .ok_or(CoreError::QuantityTooLarge {
                    current: item.quantity,
                    requested: quantity,
                })?;
            item.quantity = new_qty;
            return Ok(new_qty);
        }

        self.items.push(LineItem::new(product.id.clone(), quantity));
        Ok(quantity)
    }

    /// Removes up to `quantity` units of a product.
    ///
    /// Removing at least as many units as present deletes the line; asking
    /// for a product that is not in the cart is a no-op.
    ///
    /// ## Errors
    /// [`CoreError::InvalidQuantity`] for zero, before touching the cart.
    pub fn remove_item(&mut self, product_id: &ProductId, quantity: u32) -> CoreResult<Removal> {
        if quantity == 0 {
            return Err(CoreError::InvalidQuantity { requested: quantity });
        }

        let Some(index) = self.items.iter().position(|i| &i.product_id == product_id) else {
            return Ok(Removal::NotInCart);
        };

        let item = &mut self.items[index];
        if quantity >= item.quantity {
            self.items.remove(index);
            Ok(Removal::Removed)
        } else {
            item.quantity -= quantity;
            Ok(Removal::Decremented {
                remaining: item.quantity,
            })
        }
    }

    /// Clears all items from the cart. Idempotent.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the line for `product_id`, if any.
    pub fn find_item_by_product(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Returns how many units of `product_id` are in the cart (0 if none).
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.find_item_by_product(product_id)
            .map_or(0, |item| item.quantity)
    }

    /// Returns the number of distinct products in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity of all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn test_product(id: &str, price_cents: i64) -> Product {
        Product::new(id, format!("Product {}", id), Money::from_cents(price_cents))
    }

    #[test]
    fn test_add_item() {
        let mut cart = Cart::new("c1");
        let product = test_product("a", 1199);

        assert_eq!(cart.add_item(&product, 2).unwrap(), 2);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.items()[0].product_id, product.id);
    }

    #[test]
    fn test_add_same_product_increases_quantity() {
        let mut cart = Cart::new("c1");
        let product = test_product("a", 1199);

        cart.add_item(&product, 2).unwrap();
        assert_eq!(cart.add_item(&product, 3).unwrap(), 5);

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity_of(&product.id), 5);
    }

    #[test]
    fn test_add_keeps_line_identity() {
        let mut cart = Cart::new("c1");
        let product = test_product("a", 1199);

        cart.add_item(&product, 1).unwrap();
        let id = cart.items()[0].id.clone();
        cart.add_item(&product, 1).unwrap();
        assert_eq!(cart.items()[0].id, id);
    }

    #[test]
    fn test_add_zero_is_rejected_without_mutation() {
        let mut cart = Cart::new("c1");
        let product = test_product("a", 1199);

        let err = cart.add_item(&product, 0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidQuantity { requested: 0 }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_overflow_is_rejected_without_mutation() {
        let mut cart = Cart::new("c1");
        let product = test_product("a", 1);

        cart.add_item(&product, u32::MAX).unwrap();
        let err = cart.add_item(&product, 1).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
        assert_eq!(cart.quantity_of(&product.id), u32::MAX);
    }

    #[test]
    fn test_remove_less_than_present_decrements() {
        let mut cart = Cart::new("c1");
        let product = test_product("a", 1199);
        cart.add_item(&product, 5).unwrap();

        let outcome = cart.remove_item(&product.id, 2).unwrap();
        assert_eq!(outcome, Removal::Decremented { remaining: 3 });
        assert_eq!(cart.quantity_of(&product.id), 3);
    }

    #[test]
    fn test_remove_exact_or_more_deletes_line() {
        let mut cart = Cart::new("c1");
        let a = test_product("a", 1199);
        let b = test_product("b", 2999);
        cart.add_item(&a, 2).unwrap();
        cart.add_item(&b, 1).unwrap();

        assert_eq!(cart.remove_item(&a.id, 2).unwrap(), Removal::Removed);
        assert!(cart.find_item_by_product(&a.id).is_none());

        assert_eq!(cart.remove_item(&b.id, 7).unwrap(), Removal::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_product_is_noop() {
        let mut cart = Cart::new("c1");
        let a = test_product("a", 1199);
        cart.add_item(&a, 1).unwrap();

        let outcome = cart.remove_item(&ProductId::from("ghost"), 1).unwrap();
        assert_eq!(outcome, Removal::NotInCart);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_zero_is_rejected() {
        let mut cart = Cart::new("c1");
        let a = test_product("a", 1199);
        cart.add_item(&a, 1).unwrap();

        assert!(cart.remove_item(&a.id, 0).is_err());
        assert_eq!(cart.quantity_of(&a.id), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut cart = Cart::new("c1");
        cart.add_item(&test_product("a", 1), 2).unwrap();

        cart.clear();
        assert!(cart.is_empty());
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_with_items_validates() {
        let ok = Cart::with_items("c1", vec![LineItem::new("a", 2), LineItem::new("b", 1)]);
        assert_eq!(ok.unwrap().total_quantity(), 3);

        let dup = Cart::with_items("c1", vec![LineItem::new("a", 2), LineItem::new("a", 1)]);
        assert!(matches!(
            dup.unwrap_err(),
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));

        let zero = Cart::with_items("c1", vec![LineItem::new("a", 0)]);
        assert!(matches!(
            zero.unwrap_err(),
            CoreError::InvalidQuantity { .. }
        ));
    }

    #[test]
    fn test_deserialize_validates_and_generates_line_ids() {
        let cart: Cart = serde_json::from_str(
            r#"{ "id": "c1", "items": [ { "productId": "a", "quantity": 2 } ] }"#,
        )
        .unwrap();
        assert_eq!(cart.id().as_str(), "c1");
        assert!(!cart.items()[0].id.as_str().is_empty());

        let bad = serde_json::from_str::<Cart>(
            r#"{ "id": "c1", "items": [ { "productId": "a", "quantity": 0 } ] }"#,
        );
        assert!(bad.is_err());
    }
}
