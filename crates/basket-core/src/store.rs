//! # Store Contract
//!
//! The narrow key-value interface a cart persists through.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Store (one opaque blob per cart id)                                    │
//! │                                                                         │
//! │  get(id)        -> blob, or "" when nothing is stored                  │
//! │  put(id, blob)  -> overwrite (last writer wins)                        │
//! │  flush(id)      -> delete; deleting a missing id is not an error       │
//! │  exists(id)     -> is anything stored?                                 │
//! │                                                                         │
//! │  Implementations:                                                       │
//! │  ├── MemoryStore   (this module, process-local)                        │
//! │  ├── FileStore     (basket-store, one JSON file per cart)              │
//! │  └── SqliteStore   (basket-store, cart_blobs table)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store never interprets blobs. Decoding and validation belong to
//! [`crate::blob`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use crate::error::{StoreError, StoreResult};

/// Key-value persistence for cart blobs.
///
/// Implementations must be `Send + Sync`: one store can back many carts
/// (e.g. a cart and its [`crate::Cart::copy`]).
pub trait Store: Send + Sync + fmt::Debug {
    /// Returns the stored blob, or an empty string if none exists.
    fn get(&self, cart_id: &str) -> StoreResult<String>;

    /// Stores `data` for `cart_id`, replacing any previous blob.
    fn put(&self, cart_id: &str, data: &str) -> StoreResult<()>;

    /// Deletes the blob for `cart_id`.
    fn flush(&self, cart_id: &str) -> StoreResult<()>;

    /// Returns true if a blob is stored for `cart_id`.
    fn exists(&self, cart_id: &str) -> StoreResult<bool>;
}

// =============================================================================
// Memory Store
// =============================================================================

/// Process-local store backed by a map.
///
/// Behaves like a session: blobs live as long as the store value does.
/// Used by tests and by the CLI's `memory` backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of carts currently stored.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, String>>> {
        self.blobs
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl Store for MemoryStore {
    fn get(&self, cart_id: &str) -> StoreResult<String> {
        Ok(self.lock()?.get(cart_id).cloned().unwrap_or_default())
    }

    fn put(&self, cart_id: &str, data: &str) -> StoreResult<()> {
        self.lock()?.insert(cart_id.to_string(), data.to_string());
        Ok(())
    }

    fn flush(&self, cart_id: &str) -> StoreResult<()> {
        self.lock()?.remove(cart_id);
        Ok(())
    }

    fn exists(&self, cart_id: &str) -> StoreResult<bool> {
        Ok(self.lock()?.contains_key(cart_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
