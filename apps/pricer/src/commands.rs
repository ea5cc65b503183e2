//! # Cart Commands
//!
//! One function per CLI subcommand, operating on [`AppState`].
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐                        │
//! │  │  create  │────►│ In Cart  │────►│  price   │  (read only, repeat)   │
//! │  └──────────┘     └──────────┘     └──────────┘                        │
//! │                        │                                                │
//! │                   add / remove                                          │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear ─────────► empty cart (still exists)           │
//! │                   delete ────────► gone                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unknown carts are `NOT_FOUND`. Unknown products on add/remove are a
//! `VALIDATION_ERROR`: the request itself is wrong.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use circuit_core::{
    price_cart, Cart, CartId, LineItem, PricingResult, Product, ProductId, Removal,
};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Responses
// =============================================================================

/// Cart contents.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: CartId,
    pub items: Vec<LineItem>,
    pub item_count: usize,
    pub total_quantity: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            id: cart.id().clone(),
            items: cart.items().to_vec(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            created_at: cart.created_at(),
        }
    }
}

/// One row of `carts`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub id: CartId,
    pub item_count: usize,
    pub total_quantity: u64,
}

/// Result of `remove`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveResponse {
    pub removal: Removal,
    pub cart: CartResponse,
}

/// Result of `delete`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub id: CartId,
    pub deleted: bool,
}

// =============================================================================
// Commands
// =============================================================================

/// Lists every cart.
pub fn list_carts(state: &AppState) -> Vec<CartSummary> {
    debug!("carts command");
    state
        .carts
        .snapshot()
        .iter()
        .map(|cart| CartSummary {
            id: cart.id().clone(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
        })
        .collect()
}

/// Gets one cart's contents.
pub fn get_cart(state: &AppState, cart_id: &CartId) -> Result<CartResponse, ApiError> {
    debug!(cart_id = %cart_id, "show command");
    Ok(state.carts.with_cart(cart_id, |cart| CartResponse::from(cart))?)
}

/// Creates a cart, optionally with initial items.
///
/// ## Behavior
/// - `cart_id` defaults to a generated UUID
/// - Items are added in order; repeating a product adds its quantities
/// - Nothing is stored if any item is invalid
pub fn create_cart(
    state: &AppState,
    cart_id: Option<CartId>,
    items: &[(ProductId, u32)],
) -> Result<CartResponse, ApiError> {
    let cart_id = cart_id.unwrap_or_else(CartId::generate);
    debug!(cart_id = %cart_id, items = items.len(), "create command");

    let mut cart = Cart::new(cart_id);
    for (product_id, quantity) in items {
        let product = known_product(state, product_id)?;
        cart.add_item(product, *quantity)?;
    }

    let response = CartResponse::from(&cart);
    state.carts.insert(cart)?;
    Ok(response)
}

/// Adds a product to a cart.
///
/// ## Behavior
/// - If the product is already in the cart: quantity increases
/// - Otherwise: added as a new line
/// - Price is NOT frozen: `price` always reads the current catalog price
pub fn add_to_cart(
    state: &AppState,
    cart_id: &CartId,
    product_id: &ProductId,
    quantity: u32,
) -> Result<CartResponse, ApiError> {
    debug!(cart_id = %cart_id, product_id = %product_id, quantity, "add command");

    let product = known_product(state, product_id)?;
    let response = state.carts.with_cart_mut(cart_id, |cart| {
        cart.add_item(product, quantity)?;
        Ok::<_, ApiError>(CartResponse::from(&*cart))
    })??;

    Ok(response)
}

/// Removes up to `quantity` units of a product from a cart.
///
/// Removing more than present deletes the line; a product that is in the
/// catalog but not in the cart leaves the cart unchanged.
pub fn remove_from_cart(
    state: &AppState,
    cart_id: &CartId,
    product_id: &ProductId,
    quantity: u32,
) -> Result<RemoveResponse, ApiError> {
    debug!(cart_id = %cart_id, product_id = %product_id, quantity, "remove command");

    known_product(state, product_id)?;
    let response = state.carts.with_cart_mut(cart_id, |cart| {
        let removal = cart.remove_item(product_id, quantity)?;
        Ok::<_, ApiError>(RemoveResponse {
            removal,
            cart: CartResponse::from(&*cart),
        })
    })??;

    Ok(response)
}

/// Clears all items from a cart. The cart itself remains.
pub fn clear_cart(state: &AppState, cart_id: &CartId) -> Result<CartResponse, ApiError> {
    debug!(cart_id = %cart_id, "clear command");

    Ok(state.carts.with_cart_mut(cart_id, |cart| {
        cart.clear();
        CartResponse::from(&*cart)
    })?)
}

/// Deletes a cart.
pub fn delete_cart(state: &AppState, cart_id: &CartId) -> Result<DeleteResponse, ApiError> {
    debug!(cart_id = %cart_id, "delete command");

    let cart = state.carts.remove(cart_id)?;
    Ok(DeleteResponse {
        id: cart.id().clone(),
        deleted: true,
    })
}

/// Prices a cart against the catalog's products and rules.
pub fn price(state: &AppState, cart_id: &CartId) -> Result<PricingResult, ApiError> {
    debug!(cart_id = %cart_id, "price command");

    let result = state
        .carts
        .with_cart(cart_id, |cart| price_cart(cart, &state.catalog, &state.catalog))??;

    Ok(result)
}

fn known_product<'s>(state: &'s AppState, product_id: &ProductId) -> Result<&'s Product, ApiError> {
    state
        .catalog
        .product(product_id)
        .ok_or_else(|| ApiError::validation(format!("Unknown product: {}", product_id)))
}

// =============================================================================
// Tests
// =============================================================================
