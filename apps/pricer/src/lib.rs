//! # circuit-pricer
//!
//! Operator CLI over a TOML store file: manage carts and price them with the
//! `circuit-core` engine.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. Parse flags (clap)                                                 │
//! │  2. Initialize tracing (stderr, RUST_LOG or the default filter)        │
//! │  3. Load PricerConfig  defaults → file → env → --store                 │
//! │     then switch to logging.filter unless RUST_LOG is set              │
//! │  4. Load store file → InMemoryCatalog + CartState                      │
//! │  5. Run one command                                                    │
//! │  6. Save store file (mutating commands only)                           │
//! │  7. Print JSON to stdout, exit with the error code's status            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;
pub mod store_file;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

use circuit_core::{CartId, ProductId};

use crate::error::ApiError;
use crate::store_file::StoreFile;

// =============================================================================
// Command Line
// =============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "circuit-pricer",
    about = "Circuit Store cart pricing CLI",
    long_about = "Create and edit carts in a store file and price them against its discount rules.",
    after_help = "Examples:\n  circuit-pricer create --id c1 --item mouse=2 --item keyboard=1\n  circuit-pricer price c1"
)]
pub struct Cli {
    /// Config file (default: pricer.toml in the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Store file, overriding config and CIRCUIT_STORE_PATH
    #[arg(long, global = true, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    #[command(about = "List carts")]
    Carts,
    #[command(about = "Show a cart's items")]
    Show { cart: String },
    #[command(about = "Create a cart, optionally with items")]
    Create {
        #[arg(long, help = "Cart id (default: generated UUID)")]
        id: Option<String>,
        #[arg(long = "item", value_name = "PRODUCT=QTY", help = "Initial item, repeatable")]
        items: Vec<ItemArg>,
    },
    #[command(about = "Add units of a product to a cart")]
    Add {
        cart: String,
        product: String,
        #[arg(long, short, default_value_t = 1)]
        quantity: u32,
    },
    #[command(about = "Remove units of a product from a cart")]
    Remove {
        cart: String,
        product: String,
        #[arg(long, short, default_value_t = 1)]
        quantity: u32,
    },
    #[command(about = "Remove every item from a cart")]
    Clear { cart: String },
    #[command(about = "Delete a cart")]
    Delete { cart: String },
    #[command(about = "Price a cart: totals, discount and per-line breakdown")]
    Price { cart: String },
}

impl Command {
    /// True when the command changes carts and the store must be saved.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Create { .. }
                | Command::Add { .. }
                | Command::Remove { .. }
                | Command::Clear { .. }
                | Command::Delete { .. }
        )
    }
}

/// A `product=quantity` pair given to `create --item`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemArg {
    pub product: ProductId,
    pub quantity: u32,
}

impl FromStr for ItemArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (product, quantity) = s
            .split_once('=')
            .ok_or_else(|| format!("expected PRODUCT=QTY, got '{}'", s))?;

        let product = product.trim();
        if product.is_empty() {
            return Err(format!("missing product in '{}'", s));
        }

        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid quantity in '{}': {}", s, e))?;

        Ok(ItemArg {
            product: ProductId::from(product),
            quantity,
        })
    }
}

// =============================================================================
// Execution
// =============================================================================

/// Runs one command against the store file at `store_path`.
///
/// Mutating commands save the store file only when they succeed.
pub fn execute(command: &Command, store_path: &Path) -> Result<serde_json::Value, ApiError> {
    let state = StoreFile::load(store_path)?.into_state()?;

    let output = match command {
        Command::Carts => to_json(commands::list_carts(&state)),
        Command::Show { cart } => to_json(commands::get_cart(&state, &CartId::from(cart.as_str()))?),
        Command::Create { id, items } => {
            let items: Vec<(ProductId, u32)> = items
                .iter()
                .map(|item| (item.product.clone(), item.quantity))
                .collect();
            let id = id.as_deref().map(CartId::from);
            to_json(commands::create_cart(&state, id, &items)?)
        }
        Command::Add {
            cart,
            product,
            quantity,
        } => to_json(commands::add_to_cart(
            &state,
            &CartId::from(cart.as_str()),
            &ProductId::from(product.as_str()),
            *quantity,
        )?),
        Command::Remove {
            cart,
            product,
            quantity,
        } => to_json(commands::remove_from_cart(
            &state,
            &CartId::from(cart.as_str()),
            &ProductId::from(product.as_str()),
            *quantity,
        )?),
        Command::Clear { cart } => {
            to_json(commands::clear_cart(&state, &CartId::from(cart.as_str()))?)
        }
        Command::Delete { cart } => {
            to_json(commands::delete_cart(&state, &CartId::from(cart.as_str()))?)
        }
        Command::Price { cart } => to_json(commands::price(&state, &CartId::from(cart.as_str()))?),
    }?;

    if command.is_mutating() {
        StoreFile::from_state(&state).save(store_path)?;
        info!(path = ?store_path, "Store file updated");
    }

    Ok(output)
}

fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(format!("Failed to encode output: {}", e)))
}

/// Handle to the log filter installed by [`init_tracing`].
///
/// Logging starts before the config file is read, so messages from config
/// loading are not lost; the configured filter is applied afterwards.
pub struct LogFilter {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogFilter {
    /// Switches to the configured `logging.filter`. `RUST_LOG` wins if set.
    pub fn apply(&self, directives: &str) {
        if self.from_env {
            debug!("RUST_LOG is set, ignoring logging.filter");
            return;
        }

        if let Err(e) = self.handle.reload(EnvFilter::new(directives)) {
            warn!(error = %e, "Failed to apply logging.filter");
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=circuit_core=trace` - Trace the pricing engine only
/// - Default: `default_filter` until [`LogFilter::apply`] installs the
///   configured one
///
/// Logs go to stderr; stdout carries only command output.
pub fn init_tracing(default_filter: &str) -> LogFilter {
    let (layer, filter) = filter_layer(EnvFilter::try_from_default_env().ok(), default_filter);

    tracing_subscriber::registry()
        .with(layer)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    filter
}

fn filter_layer(
    from_env: Option<EnvFilter>,
    default_filter: &str,
) -> (reload::Layer<EnvFilter, Registry>, LogFilter) {
    let env_set = from_env.is_some();
    let initial = from_env.unwrap_or_else(|| EnvFilter::new(default_filter));
    let (layer, handle) = reload::Layer::new(initial);

    (
        layer,
        LogFilter {
            handle,
            from_env: env_set,
        },
    )
}

// =============================================================================
// Tests
// =============================================================================
