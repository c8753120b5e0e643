//! # Error Types
//!
//! Domain-specific error types for basket-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  basket-core errors (this file)                                        │
//! │  ├── CartError        - Everything a cart operation can fail with      │
//! │  ├── ValidationError  - Attribute validation failures (InvalidItem)    │
//! │  └── StoreError       - Backend read/write/delete failures (StoreIo)   │
//! │                                                                         │
//! │  basket-store errors (separate crate)                                  │
//! │  └── DbError          - SQLite failures, converted into StoreError     │
//! │                                                                         │
//! │  Flow: DbError → StoreError → CartError → CLI                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation
//! - `InvalidItem` and `ItemNotFound` are raised before any state changes.
//! - `CartRestore` aborts the whole restore; a single bad item inside an
//!   otherwise valid blob is skipped instead (see [`crate::cart::RestoreReport`]).
//! - `StoreIo` is passed through unchanged from the backend.

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Errors returned by [`crate::Cart`] and [`crate::CartItem`] operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// An attribute failed validation. The item was left unmodified.
    #[error("Invalid item: {0}")]
    InvalidItem(#[from] ValidationError),

    /// `update` / `update_quantity` referenced an identity that isn't in the cart.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// The persisted blob exists but is structurally unusable.
    ///
    /// ## When This Occurs
    /// - Blob is not valid JSON, or not a JSON object
    /// - `id` or `items` is missing or has the wrong type
    /// - Stored `id` belongs to a different cart
    #[error("Cannot restore cart {cart_id}: {reason}")]
    CartRestore { cart_id: String, reason: String },

    /// The injected backend failed.
    #[error("Store error: {0}")]
    StoreIo(#[from] StoreError),

    /// The cart state could not be encoded as JSON.
    #[error("Cannot encode cart: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CartError {
    /// Creates a CartRestore error for the given cart.
    pub fn restore(cart_id: impl Into<String>, reason: impl Into<String>) -> Self {
        CartError::CartRestore {
            cart_id: cart_id.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Attribute validation errors.
///
/// Raised synchronously by every mutation path of a [`crate::CartItem`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value must be zero or greater.
    #[error("{field} must not be negative (got {value})")]
    Negative { field: String, value: f64 },

    /// Value must be a finite number.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Value has the wrong JSON type for this field.
    #[error("{field} must be {expected}")]
    WrongType { field: String, expected: String },

    /// Field can never be written (the derived `id`).
    #[error("{field} is read-only")]
    ReadOnly { field: String },

    /// Field can never be removed (name, quantity, price, tax, id).
    #[error("{field} cannot be removed")]
    NotRemovable { field: String },
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures reported by a [`crate::Store`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to read the blob for a cart.
    #[error("failed to read cart {cart_id}: {reason}")]
    Read { cart_id: String, reason: String },

    /// Failed to write the blob for a cart.
    #[error("failed to write cart {cart_id}: {reason}")]
    Write { cart_id: String, reason: String },

    /// Failed to delete the blob for a cart.
    #[error("failed to delete cart {cart_id}: {reason}")]
    Delete { cart_id: String, reason: String },

    /// The backend cannot address this cart id (e.g. unsafe file name).
    #[error("invalid cart id {cart_id:?}: {reason}")]
    InvalidKey { cart_id: String, reason: String },

    /// The backend itself is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn read(cart_id: &str, reason: impl ToString) -> Self {
        StoreError::Read {
            cart_id: cart_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write(cart_id: &str, reason: impl ToString) -> Self {
        StoreError::Write {
            cart_id: cart_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn delete(cart_id: &str, reason: impl ToString) -> Self {
        StoreError::Delete {
            cart_id: cart_id.to_string(),
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

/// Convenience type alias for Results from backends.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
