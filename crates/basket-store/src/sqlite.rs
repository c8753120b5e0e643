//! # SQLite Store
//!
//! A synchronous [`Store`] facade over the async [`Database`].
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart::save()                                                          │
//! │       │  store.put(id, blob)            (sync)                          │
//! │       ▼                                                                 │
//! │  SqliteStore                                                           │
//! │       │  runtime.block_on(repo.put(..)) (owned tokio runtime)          │
//! │       ▼                                                                 │
//! │  CartBlobRepository ──► cart_blobs                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Caveat
//! `block_on` panics when called from inside another tokio runtime. Async
//! callers should use [`Database::cart_blobs`] directly.

use std::fmt;
use std::path::Path;

use basket_core::{Store, StoreResult};
use tokio::runtime::{Builder, Runtime};
use tracing::info;

use crate::error::{DbError, DbResult, StoreOp};
use crate::pool::{Database, DbConfig};

/// Cart blobs in a SQLite database, one row per cart id.
pub struct SqliteStore {
    // Declared first so the pool is dropped while the runtime still exists.
    db: Database,
    runtime: Runtime,
}

impl SqliteStore {
    /// Opens (or creates) the database with the given configuration and
    /// applies pending migrations.
    pub fn open(config: DbConfig) -> DbResult<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("basket-sqlite")
            .enable_all()
            .build()
            .map_err(|e| DbError::Runtime(e.to_string()))?;

        let db = runtime.block_on(Database::new(config))?;

        Ok(SqliteStore { db, runtime })
    }

    /// Opens a database file at `path`.
    pub fn open_path(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening SQLite cart store");
        Self::open(DbConfig::new(path))
    }

    /// A private in-memory database (for tests and throwaway sessions).
    pub fn in_memory() -> DbResult<Self> {
        Self::open(DbConfig::in_memory())
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Returns true if the database answers a trivial query.
    pub fn health_check(&self) -> bool {
        self.runtime.block_on(self.db.health_check())
    }
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore").field("db", &self.db).finish()
    }
}

impl Store for SqliteStore {
    fn get(&self, cart_id: &str) -> StoreResult<String> {
        let data = self
            .runtime
            .block_on(self.db.cart_blobs().get(cart_id))
            .map_err(|e| e.into_store_error(StoreOp::Read, cart_id))?;
        Ok(data.unwrap_or_default())
    }

    fn put(&self, cart_id: &str, data: &str) -> StoreResult<()> {
        self.runtime
            .block_on(self.db.cart_blobs().put(cart_id, data))
            .map_err(|e| e.into_store_error(StoreOp::Write, cart_id))
    }

    fn flush(&self, cart_id: &str) -> StoreResult<()> {
        self.runtime
            .block_on(self.db.cart_blobs().delete(cart_id))
            .map(|_| ())
            .map_err(|e| e.into_store_error(StoreOp::Delete, cart_id))
    }

    fn exists(&self, cart_id: &str) -> StoreResult<bool> {
        self.runtime
            .block_on(self.db.cart_blobs().exists(cart_id))
            .map_err(|e| e.into_store_error(StoreOp::Read, cart_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
