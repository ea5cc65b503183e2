//! # API Error Type
//!
//! Unified error type for pricer commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in circuit-pricer                         │
//! │                                                                         │
//! │  circuit-pricer price demo                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store file error? ── StoreFileError::Parse(...) ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Core error? ─────── CoreError::CartNotFound ──── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stdout: { "code": "NOT_FOUND", "message": "Cart not found: demo" }    │
//! │  exit:   66                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::error;

use circuit_core::CoreError;

use crate::store_file::StoreFileError;

/// Error printed when a command fails.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Cart not found: demo"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Cart or product does not exist (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Catalog or rule store could not answer (503)
    LookupFailed,

    /// Anything else (500)
    Internal,
}

impl ErrorCode {
    /// Process exit status for this code, following `sysexits.h`.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorCode::ValidationError => 65, // EX_DATAERR
            ErrorCode::NotFound => 66,        // EX_NOINPUT
            ErrorCode::LookupFailed => 69,    // EX_UNAVAILABLE
            ErrorCode::Internal => 70,        // EX_SOFTWARE
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::CartNotFound(id) => ApiError::not_found("Cart", &id),
            CoreError::Lookup(e) => {
                error!("Lookup failed: {}", e);
                ApiError::new(ErrorCode::LookupFailed, e.to_string())
            }
            e @ (CoreError::InvalidQuantity { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::Validation(_)
            | CoreError::AmountOverflow { .. }) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts store file errors to API errors.
impl From<StoreFileError> for ApiError {
    fn from(err: StoreFileError) -> Self {
        match err {
            StoreFileError::Parse { .. } | StoreFileError::Invalid(_) => {
                ApiError::validation(err.to_string())
            }
            StoreFileError::Io { .. } | StoreFileError::Serialize(_) => {
                error!("Store file error: {}", err);
                ApiError::internal(err.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
