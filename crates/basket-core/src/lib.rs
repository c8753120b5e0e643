//! # basket-core: Cart Aggregate with Pluggable Persistence
//!
//! This crate is the **heart** of Basket. It owns the cart domain model and
//! talks to storage only through the [`Store`] trait.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Basket Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    basket-cli (apps/)                           │   │
//! │  │    add, remove, update, qty, show, json, clear, copy, merge    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ basket-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   item    │  │   cart    │  │   blob    │  │   store   │  │   │
//! │  │   │ CartItem  │  │   Cart    │  │ encode /  │  │ Store     │  │   │
//! │  │   │ identity  │  │  totals   │  │ validate  │  │ trait +   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  │ MemoryStore│  │   │
//! │  │                                                └───────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ dyn Store                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               basket-store (FileStore, SqliteStore)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`item`] - `CartItem`, its identity hash and derived pricing
//! - [`cart`] - `Cart`, merge rules, totals, dirty tracking
//! - [`blob`] - Persisted blob layout and restore validation
//! - [`store`] - `Store` trait and the in-process `MemoryStore`
//! - [`types`] - Summary and metadata views
//! - [`validation`] - Attribute rules shared by every setter
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use basket_core::{Cart, CartItem, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let mut cart = Cart::new("checkout-1", store).unwrap();
//!
//! cart.add(CartItem::new("Widget", 10.0, 1.0, 1).unwrap());
//! cart.add(CartItem::new("Widget", 10.0, 1.0, 1).unwrap()); // same identity: merged
//!
//! assert_eq!(cart.total_unique_items(), 1);
//! assert_eq!(cart.total_items(), 2);
//! assert_eq!(cart.total(), 22.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod blob;
pub mod cart;
pub mod error;
pub mod item;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use blob::CartBlob;
pub use cart::{Cart, RestoreReport};
pub use error::{CartError, CartResult, StoreError, StoreResult, ValidationError};
pub use item::{CartItem, CoreField, ItemSnapshot};
pub use store::{MemoryStore, Store};
pub use types::{CartMeta, CartSummary};
