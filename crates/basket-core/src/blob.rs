//! # Cart Blob Codec
//!
//! Encodes a cart into the opaque string a [`crate::Store`] holds, and
//! validates such a string on the way back in.
//!
//! ## Blob Layout
//! ```text
//! {
//!   "id": "cart-42",
//!   "items": [
//!     { "identity": "9f86d0…", "attributes": { "name": "Widget", "quantity": 2, ... } }
//!   ],
//!   "meta": { "totalItems": 2, "uniqueItems": 1, "subtotal": 20.0, ... }
//! }
//! ```
//!
//! ## Decode Outcomes
//! ```text
//! raw blob
//!   │
//!   ├── "", "null", "[]", "{}"          ──► Ok(None)        nothing stored
//!   │
//!   ├── bad JSON / not an object
//!   │   missing or mistyped id / items
//!   │   id of another cart              ──► Err(CartRestore) whole blob rejected
//!   │
//!   └── valid shape                     ──► Ok(Some(decoded))
//!         └── entry that can't become a CartItem ──► skipped, counted
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{CartError, CartResult};
use crate::item::{CartItem, ItemSnapshot};
use crate::types::CartMeta;

/// Full persisted state of a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartBlob {
    pub id: String,
    pub items: Vec<ItemSnapshot>,
    pub meta: CartMeta,
}

impl CartBlob {
    /// Compact JSON, as written to the store.
    pub fn to_json(&self) -> CartResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON, for humans.
    pub fn to_json_pretty(&self) -> CartResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of decoding a structurally valid blob.
#[derive(Debug)]
pub struct DecodedBlob {
    /// Items in stored order. Duplicated identities are left for the cart to merge.
    pub items: Vec<CartItem>,
    /// Entries that could not be rebuilt into an item.
    pub skipped: usize,
}

/// Decodes and validates a stored blob for `cart_id`.
///
/// ## Returns
/// - `Ok(None)` - nothing is stored
/// - `Ok(Some(_))` - blob is usable; unusable entries were skipped
/// - `Err(CartError::CartRestore)` - blob is present but structurally invalid
pub fn decode(cart_id: &str, raw: &str) -> CartResult<Option<DecodedBlob>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CartError::restore(cart_id, format!("blob is not valid JSON: {e}")))?;

    let object = match value {
        Value::Null => return Ok(None),
        Value::Array(ref entries) if entries.is_empty() => return Ok(None),
        Value::Object(object) if object.is_empty() => return Ok(None),
        Value::Object(object) => object,
        _ => return Err(CartError::restore(cart_id, "blob must be a JSON object")),
    };

    let stored_id = match object.get("id") {
        Some(Value::String(id)) => id,
        Some(_) => return Err(CartError::restore(cart_id, "id must be a string")),
        None => return Err(CartError::restore(cart_id, "blob has no id")),
    };
    if stored_id != cart_id {
        return Err(CartError::restore(
            cart_id,
            format!("blob belongs to cart {stored_id}"),
        ));
    }

    let entries = match object.get("items") {
        Some(Value::Array(entries)) => entries,
        Some(_) => return Err(CartError::restore(cart_id, "items must be an array")),
        None => return Err(CartError::restore(cart_id, "blob has no items")),
    };

    let mut items = Vec::with_capacity(entries.len());
    let mut skipped = 0;
    for (index, entry) in entries.iter().enumerate() {
        match decode_entry(entry) {
            Ok(item) => items.push(item),
            Err(reason) => {
                debug!(cart_id = %cart_id, index, %reason, "Skipping unreadable cart entry");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(cart_id = %cart_id, skipped, restored = items.len(), "Partially restored cart");
    }

    Ok(Some(DecodedBlob { items, skipped }))
}

fn decode_entry(entry: &Value) -> Result<CartItem, String> {
    let entry = entry.as_object().ok_or("entry is not an object")?;
    let attributes: &Map<String, Value> = entry
        .get("attributes")
        .and_then(Value::as_object)
        .ok_or("entry has no attributes object")?;

    let item = CartItem::from_attributes(attributes.clone()).map_err(|e| e.to_string())?;

    if let Some(stored) = entry.get("identity").and_then(Value::as_str) {
        if stored != item.identity() {
            // Recomputed identity wins; the stored one may come from an older hash input.
            debug!(stored, computed = item.identity(), "Stored identity differs");
        }
    }

    Ok(item)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn restore_reason(result: CartResult<Option<DecodedBlob>>) -> String {
        match result {
            Err(CartError::CartRestore { reason, .. }) => reason,
            other => panic!("expected CartRestore, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_encodings_mean_absent() {
        for raw in ["", "   ", "null", "[]", "{}"] {
            assert!(decode("c1", raw).unwrap().is_none(), "raw = {raw:?}");
        }
    }

    #[test]
    fn test_structural_failures() {
        assert!(restore_reason(decode("c1", "{not json")).contains("not valid JSON"));
        assert!(restore_reason(decode("c1", "[1, 2]")).contains("JSON object"));
        assert!(restore_reason(decode("c1", r#"{"items": []}"#)).contains("no id"));
        assert!(restore_reason(decode("c1", r#"{"id": 5, "items": []}"#)).contains("string"));
        assert!(restore_reason(decode("c1", r#"{"id": "c1"}"#)).contains("no items"));
        assert!(
            restore_reason(decode("c1", r#"{"id": "c1", "items": {}}"#)).contains("array")
        );
        assert!(
            restore_reason(decode("c1", r#"{"id": "c2", "items": []}"#)).contains("cart c2")
        );
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let raw = json!({
            "id": "c1",
            "items": [
                { "identity": "x", "attributes": { "name": "Good", "price": 1.0, "quantity": 2 } },
                { "attributes": { "name": "Negative", "price": -1.0 } },
                { "attributes": "nope" },
                42
            ]
        })
        .to_string();

        let decoded = decode("c1", &raw).unwrap().unwrap();
        assert_eq!(decoded.items.len(), 1);
        assert_eq!(decoded.items[0].name(), "Good");
        assert_eq!(decoded.items[0].quantity(), 2);
        assert_eq!(decoded.skipped, 3);
    }

    #[test]
    fn test_meta_is_not_validated() {
        let raw = json!({ "id": "c1", "items": [], "meta": "garbage" }).to_string();
        let decoded = decode("c1", &raw).unwrap().unwrap();
        assert!(decoded.items.is_empty());
        assert_eq!(decoded.skipped, 0);
    }
}
