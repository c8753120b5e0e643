//! # Repository Module
//!
//! Database repository implementations for Basket.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  SqliteStore (sync Store facade)                                       │
//! │       │                                                                 │
//! │       │  db.cart_blobs().put("checkout-1", json)                       │
//! │       ▼                                                                 │
//! │  CartBlobRepository                                                    │
//! │  ├── get(&self, cart_id)                                               │
//! │  ├── put(&self, cart_id, data)                                         │
//! │  ├── delete(&self, cart_id)                                            │
//! │  └── exists(&self, cart_id)                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database (cart_blobs)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`cart_blob::CartBlobRepository`] - One JSON blob per cart id

pub mod cart_blob;
