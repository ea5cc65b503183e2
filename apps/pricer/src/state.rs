//! # Application State
//!
//! The catalog and the cart registry a command works against.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CartState                                          │
//! │                                                                         │
//! │  RwLock<HashMap<CartId, Arc<Mutex<Cart>>>>                              │
//! │     │                          │                                        │
//! │     │                          └── one writer per cart                  │
//! │     │                              (add / remove / clear, pricing)      │
//! │     │                                                                   │
//! │     └── write lock only to create or delete a cart; every other        │
//! │         operation takes the read lock and clones the cart's Arc        │
//! │                                                                         │
//! │  Two commands on different carts never wait for each other.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use circuit_core::{Cart, CartId, CoreError, CoreResult, InMemoryCatalog, ValidationError};

/// Everything a command needs.
#[derive(Debug, Default)]
pub struct AppState {
    pub catalog: InMemoryCatalog,
    pub carts: CartState,
}

/// Registry of carts with per-cart locking.
#[derive(Debug, Default)]
pub struct CartState {
    carts: RwLock<HashMap<CartId, Arc<Mutex<Cart>>>>,
}

impl CartState {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from loaded carts. Later duplicates replace earlier ones.
    pub fn from_carts(carts: Vec<Cart>) -> Self {
        let map = carts
            .into_iter()
            .map(|cart| (cart.id().clone(), Arc::new(Mutex::new(cart))))
            .collect();

        CartState {
            carts: RwLock::new(map),
        }
    }

    /// Adds a new cart.
    ///
    /// ## Errors
    /// [`ValidationError::Duplicate`] if a cart with that id exists.
    pub fn insert(&self, cart: Cart) -> CoreResult<()> {
        let mut carts = self.carts.write().unwrap_or_else(PoisonError::into_inner);

        if carts.contains_key(cart.id()) {
            return Err(ValidationError::Duplicate {
                field: "cart id".to_string(),
                value: cart.id().to_string(),
            }
            .into());
        }

        carts.insert(cart.id().clone(), Arc::new(Mutex::new(cart)));
        Ok(())
    }

    /// Deletes a cart and returns it.
    pub fn remove(&self, id: &CartId) -> CoreResult<Cart> {
        let handle = self
            .carts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| CoreError::CartNotFound(id.to_string()))?;

        let cart = handle.lock().unwrap_or_else(PoisonError::into_inner).clone();
        Ok(cart)
    }

    /// Executes a function with read access to one cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let qty = carts.with_cart(&id, |cart| cart.total_quantity())?;
    /// ```
    pub fn with_cart<F, R>(&self, id: &CartId, f: F) -> CoreResult<R>
    where
        F: FnOnce(&Cart) -> R,
    {
        let handle = self.handle(id)?;
        let cart = handle.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&cart))
    }

    /// Executes a function with write access to one cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// carts.with_cart_mut(&id, |cart| cart.add_item(&product, 1))??;
    /// ```
    pub fn with_cart_mut<F, R>(&self, id: &CartId, f: F) -> CoreResult<R>
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let handle = self.handle(id)?;
        let mut cart = handle.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut cart))
    }

    /// Copies every cart, sorted by id.
    pub fn snapshot(&self) -> Vec<Cart> {
        let handles: Vec<Arc<Mutex<Cart>>> = self
            .carts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        let mut carts: Vec<Cart> = handles
            .iter()
            .map(|handle| handle.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .collect();
        carts.sort_by(|a, b| a.id().cmp(b.id()));
        carts
    }

    fn handle(&self, id: &CartId) -> CoreResult<Arc<Mutex<Cart>>> {
        self.carts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::CartNotFound(id.to_string()))
    }
}
