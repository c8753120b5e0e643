//! # Cart
//!
//! The cart aggregate: an insertion-ordered set of line items keyed by
//! identity, with totals, dirty tracking and persistence through a
//! [`Store`].
//!
//! ## Persistence State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            add / remove / update / update_quantity / merge             │
//! │   ┌───────┐ ─────────────────────────────────────────────► ┌───────┐   │
//! │   │ clean │                                                 │ dirty │   │
//! │   └───────┘ ◄───────────────────────────────────────────── └───────┘   │
//! │       ▲        save (writes)   clear (flushes)                  │       │
//! │       │        restore / refresh (reloads)                      │       │
//! │       │                                                         │       │
//! │       └── save is a no-op here                drop: best-effort ┘       │
//! │                                               save, errors logged       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Merge Rule
//! Adding an item whose identity is already in the cart adds to the existing
//! quantity; it never creates a second line and never replaces attributes.
//!
//! ## Teardown
//! Call [`Cart::close`] to save and see the error. A dirty cart that is just
//! dropped still tries to save, but any failure is only logged.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::blob::{self, CartBlob};
use crate::error::{CartError, CartResult};
use crate::item::CartItem;
use crate::store::Store;
use crate::types::{CartMeta, CartSummary};

/// Outcome of the most recent restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    /// Stored entries that became cart lines (before identity merging).
    pub restored: usize,
    /// Stored entries that could not be rebuilt and were dropped.
    pub skipped: usize,
}

/// A shopping cart bound to one id in one store.
///
/// ## Invariants
/// - Every line's position key is its current identity; no two lines share one
/// - `dirty` is true iff in-memory state may differ from what was last stored
#[derive(Debug)]
pub struct Cart {
    id: String,
    items: Vec<CartItem>,
    dirty: bool,
    store: Arc<dyn Store>,
    autosave: bool,
    last_restore: RestoreReport,
}

impl Cart {
    /// Opens the cart `id`, restoring whatever the store holds for it.
    ///
    /// ## Errors
    /// - `CartRestore` if a blob exists but is structurally invalid
    /// - `StoreIo` if the store cannot be read
    ///
    /// ## Example
    /// ```rust
    /// use std::sync::Arc;
    /// use basket_core::{Cart, CartItem, MemoryStore};
    ///
    /// let store = Arc::new(MemoryStore::new());
    /// let mut cart = Cart::new("cart-1", store.clone()).unwrap();
    /// cart.add(CartItem::new("Widget", 10.0, 1.0, 2).unwrap());
    /// cart.close().unwrap();
    ///
    /// let reopened = Cart::new("cart-1", store).unwrap();
    /// assert_eq!(reopened.total(), 22.0);
    /// ```
    pub fn new(id: impl Into<String>, store: Arc<dyn Store>) -> CartResult<Self> {
        let mut cart = Cart::detached(id.into(), store);
        cart.restore()?;
        Ok(cart)
    }

    /// Opens a cart under a freshly generated UUID v4 id.
    pub fn create(store: Arc<dyn Store>) -> CartResult<Self> {
        Cart::new(Uuid::new_v4().to_string(), store)
    }

    fn detached(id: String, store: Arc<dyn Store>) -> Self {
        Cart {
            id,
            items: Vec::new(),
            dirty: false,
            store,
            autosave: true,
            last_restore: RestoreReport::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The store this cart persists to.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Report from the last successful restore.
    pub fn last_restore(&self) -> RestoreReport {
        self.last_restore
    }

    /// Enables or disables the best-effort save when a dirty cart is dropped.
    pub fn set_autosave(&mut self, enabled: bool) -> &mut Self {
        self.autosave = enabled;
        self
    }

    fn position(&self, identity: &str) -> Option<usize> {
        self.items.iter().position(|item| item.identity() == identity)
    }

    /// Appends `item`, or merges it into the line with the same identity.
    fn merge_line(&mut self, item: CartItem) {
        match self.position(item.identity()) {
            Some(index) => self.items[index].merge_quantity(item.quantity()),
            None => self.items.push(item),
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Adds an item, merging quantities with an existing line of equal identity.
    pub fn add(&mut self, item: CartItem) -> &mut Self {
        debug!(
            cart_id = %self.id,
            identity = item.identity(),
            quantity = item.quantity(),
            "Adding item"
        );
        self.merge_line(item);
        self.dirty = true;
        self
    }

    /// Removes the line with this identity. Missing identities are ignored.
    pub fn remove(&mut self, identity: &str) -> &mut Self {
        if let Some(index) = self.position(identity) {
            debug!(cart_id = %self.id, identity, "Removing item");
            self.items.remove(index);
            self.dirty = true;
        }
        self
    }

    /// Sets one attribute of a line through the item's validated setter.
    ///
    /// If the write changes the line's identity and it now equals another
    /// line's, the two are merged at the earlier position.
    ///
    /// ## Errors
    /// - `ItemNotFound` if no line has this identity
    /// - `InvalidItem` if the item rejects the value (the line is unchanged)
    pub fn update(
        &mut self,
        identity: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> CartResult<&mut Self> {
        let index = self
            .position(identity)
            .ok_or_else(|| CartError::ItemNotFound(identity.to_string()))?;

        self.items[index].set(key, value)?;
        self.dirty = true;
        debug!(cart_id = %self.id, identity, key, "Updated item");

        let new_identity = self.items[index].identity().to_string();
        if new_identity != identity {
            let duplicate = (0..self.items.len())
                .find(|&other| other != index && self.items[other].identity() == new_identity);

            if let Some(other) = duplicate {
                let (keep, absorb) = if other < index { (other, index) } else { (index, other) };
                let absorbed = self.items.remove(absorb);
                self.items[keep].merge_quantity(absorbed.quantity());
                debug!(cart_id = %self.id, identity = %new_identity, "Merged lines after update");
            }
        }

        Ok(self)
    }

    /// Sets a line's quantity; zero or less removes the line.
    pub fn update_quantity(&mut self, identity: &str, quantity: i64) -> CartResult<&mut Self> {
        if quantity <= 0 {
            return Ok(self.remove(identity));
        }
        self.update(identity, "quantity", quantity)
    }

    /// Adds independent copies of every line of `other`.
    pub fn merge(&mut self, other: &Cart) -> &mut Self {
        for item in &other.items {
            self.add(item.copy());
        }
        self
    }

    /// Empties the cart and deletes its blob from the store.
    ///
    /// Always flushes, dirty or not.
    pub fn clear(&mut self) -> CartResult<&mut Self> {
        debug!(cart_id = %self.id, "Clearing cart");
        self.items.clear();

        if let Err(err) = self.store.flush(&self.id) {
            // Memory is now empty while the store still holds the old blob.
            self.dirty = true;
            return Err(err.into());
        }

        self.dirty = false;
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// Writes the cart to the store if it has unsaved changes.
    ///
    /// ## Returns
    /// `true` if a write happened, `false` if the cart was already clean.
    pub fn save(&mut self) -> CartResult<bool> {
        if !self.dirty {
            return Ok(false);
        }

        let mut blob = self.serialize();
        blob.meta.saved_at = Some(Utc::now());
        let data = blob.to_json()?;

        self.store.put(&self.id, &data)?;
        self.dirty = false;

        debug!(cart_id = %self.id, bytes = data.len(), "Saved cart");
        Ok(true)
    }

    /// Replaces in-memory state with what the store holds.
    ///
    /// An absent blob leaves the cart empty. Unreadable entries inside an
    /// otherwise valid blob are skipped and counted in the report.
    ///
    /// ## Errors
    /// On `CartRestore` or `StoreIo` the in-memory state is left untouched.
    pub fn restore(&mut self) -> CartResult<RestoreReport> {
        let raw = self.store.get(&self.id)?;
        let decoded = blob::decode(&self.id, &raw)?;

        self.items.clear();
        let report = match decoded {
            None => RestoreReport::default(),
            Some(decoded) => {
                let restored = decoded.items.len();
                for item in decoded.items {
                    self.merge_line(item);
                }
                RestoreReport {
                    restored,
                    skipped: decoded.skipped,
                }
            }
        };

        self.dirty = false;
        self.last_restore = report;
        debug!(
            cart_id = %self.id,
            lines = self.items.len(),
            skipped = report.skipped,
            "Restored cart"
        );
        Ok(report)
    }

    /// Drops unsaved changes and reloads from the store.
    pub fn refresh(&mut self) -> CartResult<RestoreReport> {
        self.items.clear();
        self.dirty = false;
        self.restore()
    }

    /// Saves and releases the cart, reporting any store failure.
    pub fn close(mut self) -> CartResult<()> {
        self.autosave = false;
        self.save()?;
        Ok(())
    }

    /// Creates a cart under `new_id` in the same store, holding independent
    /// copies of every line.
    ///
    /// The copy does not read the store; it starts dirty when it has lines,
    /// so saving it overwrites anything stored under `new_id`.
    pub fn copy(&self, new_id: impl Into<String>) -> Cart {
        let mut copy = Cart::detached(new_id.into(), Arc::clone(&self.store));
        copy.items = self.items.iter().map(CartItem::copy).collect();
        copy.dirty = !copy.items.is_empty();
        copy.autosave = self.autosave;
        copy
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn get(&self, identity: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.identity() == identity)
    }

    pub fn has(&self, identity: &str) -> bool {
        self.position(identity).is_some()
    }

    /// Lines in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter()
    }

    /// First line added, if any.
    pub fn first(&self) -> Option<&CartItem> {
        self.items.first()
    }

    /// First line matching `predicate`, in insertion order.
    pub fn first_where<P>(&self, mut predicate: P) -> Option<&CartItem>
    where
        P: FnMut(&CartItem) -> bool,
    {
        self.items.iter().find(|item| predicate(item))
    }

    pub fn filter<P>(&self, mut predicate: P) -> Vec<&CartItem>
    where
        P: FnMut(&CartItem) -> bool,
    {
        self.items.iter().filter(|item| predicate(item)).collect()
    }

    pub fn map<T, F>(&self, transform: F) -> Vec<T>
    where
        F: FnMut(&CartItem) -> T,
    {
        self.items.iter().map(transform).collect()
    }

    /// Number of distinct lines.
    pub fn total_unique_items(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities, saturating at `i64::MAX`.
    pub fn total_items(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, item| total.saturating_add(item.quantity()))
    }

    /// Sum of line totals before tax.
    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::total_price_excluding_tax).sum()
    }

    /// Sum of line taxes.
    pub fn tax(&self) -> f64 {
        self.items.iter().map(CartItem::total_tax).sum()
    }

    /// Sum of line totals including tax.
    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::total_price).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            id: self.id.clone(),
            total_items: self.total_items(),
            unique_items: self.total_unique_items(),
            subtotal: self.subtotal(),
            tax: self.tax(),
            total: self.total(),
            is_empty: self.is_empty(),
        }
    }

    /// Full structural snapshot: id, every line, and aggregate metadata.
    pub fn serialize(&self) -> CartBlob {
        CartBlob {
            id: self.id.clone(),
            items: self.map(CartItem::snapshot),
            meta: CartMeta::from(&self.summary()),
        }
    }

    /// JSON text form of [`Cart::serialize`].
    pub fn to_json(&self) -> CartResult<String> {
        self.serialize().to_json()
    }
}

impl Drop for Cart {
    fn drop(&mut self) {
        if !(self.dirty && self.autosave) {
            return;
        }
        if let Err(err) = self.save() {
            warn!(cart_id = %self.id, error = %err, "Failed to save cart on drop");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
