//! # File Store
//!
//! One JSON file per cart in a directory.
//!
//! ```text
//! <dir>/
//! ├── checkout-1.json
//! └── 0b6c...e1.json      (Cart::create ids are uuids)
//! ```
//!
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a reader never sees a half-written blob.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use basket_core::{Store, StoreError, StoreResult};
use tracing::debug;

const EXTENSION: &str = "json";

/// Cart blobs stored as `<dir>/<cart_id>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Uses `dir` as the storage directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::Unavailable(format!("cannot create {}: {e}", dir.display()))
        })?;
        debug!(dir = %dir.display(), "File cart store ready");
        Ok(FileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the blob for `cart_id`.
    ///
    /// Ids are restricted to ASCII alphanumerics, `-` and `_` so that an id
    /// can never escape the directory.
    pub fn path_for(&self, cart_id: &str) -> StoreResult<PathBuf> {
        if cart_id.is_empty() {
            return Err(StoreError::InvalidKey {
                cart_id: cart_id.to_string(),
                reason: "cart id is empty".to_string(),
            });
        }
        if let Some(bad) = cart_id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(StoreError::InvalidKey {
                cart_id: cart_id.to_string(),
                reason: format!("character {bad:?} is not allowed"),
            });
        }
        Ok(self.dir.join(format!("{cart_id}.{EXTENSION}")))
    }
}

impl Store for FileStore {
    fn get(&self, cart_id: &str) -> StoreResult<String> {
        let path = self.path_for(cart_id)?;
        match fs::read_to_string(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(StoreError::read(cart_id, e)),
        }
    }

    fn put(&self, cart_id: &str, data: &str) -> StoreResult<()> {
        let path = self.path_for(cart_id)?;
        let tmp = path.with_extension(format!("{EXTENSION}.tmp"));

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(data.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::write(cart_id, e)
        })?;

        debug!(cart_id = %cart_id, bytes = data.len(), "Wrote cart file");
        Ok(())
    }

    fn flush(&self, cart_id: &str) -> StoreResult<()> {
        let path = self.path_for(cart_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::delete(cart_id, e)),
        }
    }

    fn exists(&self, cart_id: &str) -> StoreResult<bool> {
        let path = self.path_for(cart_id)?;
        path.try_exists().map_err(|e| StoreError::read(cart_id, e))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
