//! # basket-store: Persistence Backends for Basket
//!
//! Implementations of the [`basket_core::Store`] contract beyond the
//! in-process `MemoryStore`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Basket Data Flow                                 │
//! │                                                                         │
//! │  Cart::save() / Cart::restore()                                        │
//! │       │  Arc<dyn Store>                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  basket-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  FileStore    │    │  SqliteStore  │    │  Migrations  │  │   │
//! │  │   │  (file.rs)    │    │  (sqlite.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │      │        │    │              │  │   │
//! │  │   │ <id>.json     │    │  Database     │    │ 001_cart_    │  │   │
//! │  │   │ atomic rename │    │  CartBlobRepo │    │   blobs.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`file`] - Directory of JSON files
//! - [`sqlite`] - Synchronous store over SQLite
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Async cart blob repository
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use basket_core::Cart;
//! use basket_store::SqliteStore;
//!
//! let store = Arc::new(SqliteStore::open_path("basket.db")?);
//! let mut cart = Cart::new("checkout-1", store)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod file;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod sqlite;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, StoreOp};
pub use file::FileStore;
pub use pool::{Database, DbConfig};
pub use repository::cart_blob::CartBlobRepository;
pub use sqlite::SqliteStore;
