//! # Store File
//!
//! The TOML document holding products, discount rules and carts.
//!
//! ## Format
//! ```toml
//! [[products]]
//! id = "mouse"
//! name = "Wireless Mouse"
//! price = "11.99"            # decimal string, never a float
//!
//! [[discounts]]
//! id = "second-mouse-half-off"
//! requiredProduct = "mouse"
//! requiredQuantity = 1
//! targetProduct = "mouse"
//! discount = { type = "PERCENTAGE", value = "50" }
//! enabled = true             # optional, defaults to true
//!
//! [[carts]]
//! id = "demo"
//!
//! [[carts.items]]
//! productId = "mouse"
//! quantity = 2
//! ```
//!
//! ## Load / Save Cycle
//! ```text
//! store.toml ──load──► StoreFile ──into_state──► AppState ──command──►
//!                                                    │
//!     store.toml ◄──save── StoreFile ◄──from_state───┘ (mutating commands)
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use circuit_core::{Cart, DiscountRule, InMemoryCatalog, Product, ValidationError};

use crate::state::{AppState, CartState};

// =============================================================================
// Errors
// =============================================================================

/// Errors reading or writing the store file.
#[derive(Debug, Error)]
pub enum StoreFileError {
    /// The file could not be read or written.
    #[error("Store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the expected shape.
    #[error("Store file {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The store could not be rendered as TOML.
    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Parsed fine, but the data breaks a catalog or cart rule.
    #[error("Invalid store data: {0}")]
    Invalid(#[from] ValidationError),
}

pub type StoreFileResult<T> = Result<T, StoreFileError>;

// =============================================================================
// Store File
// =============================================================================

/// Serialized form of everything the pricer knows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default)]
    pub discounts: Vec<DiscountRule>,

    #[serde(default)]
    pub carts: Vec<Cart>,
}

impl StoreFile {
    /// Reads and parses a store file.
    pub fn load(path: &Path) -> StoreFileResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| StoreFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::parse(&contents).map_err(|source| StoreFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            ?path,
            products = store.products.len(),
            discounts = store.discounts.len(),
            carts = store.carts.len(),
            "Loaded store file"
        );
        Ok(store)
    }

    /// Parses store file contents.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Writes the store file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> StoreFileResult<()> {
        let io_err = |source| StoreFileError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(io_err)?;

        debug!(?path, carts = self.carts.len(), "Store file saved");
        Ok(())
    }

    /// Validates the data and builds the in-memory state.
    ///
    /// ## Errors
    /// - Two products or two carts with the same id
    /// - Any product or rule failing validation, or a rule naming an
    ///   unknown product
    pub fn into_state(self) -> StoreFileResult<AppState> {
        let mut catalog = InMemoryCatalog::new();

        for product in self.products {
            let id = product.id.clone();
            if catalog.insert_product(product)?.is_some() {
                return Err(ValidationError::Duplicate {
                    field: "product id".to_string(),
                    value: id.to_string(),
                }
                .into());
            }
        }

        for rule in self.discounts {
            catalog.insert_rule(rule)?;
        }

        let mut seen = HashSet::with_capacity(self.carts.len());
        for cart in &self.carts {
            if !seen.insert(cart.id().clone()) {
                return Err(ValidationError::Duplicate {
                    field: "cart id".to_string(),
                    value: cart.id().to_string(),
                }
                .into());
            }
        }

        Ok(AppState {
            catalog,
            carts: CartState::from_carts(self.carts),
        })
    }

    /// Captures the current state for saving.
    pub fn from_state(state: &AppState) -> Self {
        StoreFile {
            products: state.catalog.products().cloned().collect(),
            discounts: state.catalog.rules().cloned().collect(),
            carts: state.carts.snapshot(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
