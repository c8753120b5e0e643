//! # Cart Items
//!
//! A [`CartItem`] is one line of a cart: a name, a quantity, a unit price, a
//! unit tax, and any number of extra attributes (sku, colour, size...).
//!
//! ## Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  { name, price, tax, ...custom }  ──► canonical JSON ──► SHA-256 ──► hex│
//! │                                                                         │
//! │  quantity is NOT part of the identity:                                 │
//! │    Widget ×1 @ 9.99   ─┐                                               │
//! │                        ├─► same identity ─► merged into one cart line  │
//! │    Widget ×3 @ 9.99   ─┘                                               │
//! │                                                                         │
//! │    Widget ×1 @ 9.99 {colour: red}  ─► different identity               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The identity is computed on first use and cached. Writing any attribute
//! other than `quantity` drops the cache.
//!
//! ## Attribute Access
//! Typed setters (`set_price`, ...) and the generic [`CartItem::set`] share a
//! single validated path, so `item.set("price", -1)` fails exactly like
//! `item.set_price(-1.0)`.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::ValidationError;
use crate::validation::{
    amount_from_value, name_from_value, quantity_from_value, validate_amount, validate_quantity,
    ValidationResult,
};

/// Attribute key of the derived identity. Readable, never writable.
pub const ID_KEY: &str = "id";

// =============================================================================
// Core Fields
// =============================================================================

/// The typed fields every item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreField {
    Name,
    Quantity,
    Price,
    Tax,
}

impl CoreField {
    pub const ALL: [CoreField; 4] = [
        CoreField::Name,
        CoreField::Quantity,
        CoreField::Price,
        CoreField::Tax,
    ];

    /// Attribute key for this field.
    pub const fn key(self) -> &'static str {
        match self {
            CoreField::Name => "name",
            CoreField::Quantity => "quantity",
            CoreField::Price => "price",
            CoreField::Tax => "tax",
        }
    }

    /// Maps an attribute key to a core field, if it is one.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Structural snapshot of an item, as stored in a cart blob.
///
/// `attributes` holds every field except `id` and is enough to rebuild an
/// equivalent item with [`CartItem::from_attributes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub identity: String,
    pub attributes: Map<String, Value>,
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line item.
///
/// ## Invariants
/// - `quantity`, `price` and `tax` are never negative
/// - `price` and `tax` are always finite
/// - custom attributes never shadow a core field or `id`
#[derive(Debug, Clone)]
pub struct CartItem {
    name: String,
    quantity: i64,
    price: f64,
    tax: f64,
    custom: BTreeMap<String, Value>,
    identity: OnceCell<String>,
}

impl Default for CartItem {
    /// An unnamed, free, untaxed item with quantity 1.
    fn default() -> Self {
        CartItem {
            name: String::new(),
            quantity: 1,
            price: 0.0,
            tax: 0.0,
            custom: BTreeMap::new(),
            identity: OnceCell::new(),
        }
    }
}

impl CartItem {
    /// Creates an item from its four core fields.
    ///
    /// ## Example
    /// ```rust
    /// use basket_core::CartItem;
    ///
    /// let item = CartItem::new("Widget", 10.0, 1.0, 2).unwrap();
    /// assert_eq!(item.total_price(), 22.0);
    /// assert!(CartItem::new("Widget", -10.0, 0.0, 1).is_err());
    /// ```
    pub fn new(name: impl Into<String>, price: f64, tax: f64, quantity: i64) -> ValidationResult<Self> {
        Ok(CartItem {
            name: name.into(),
            quantity: validate_quantity(quantity)?,
            price: validate_amount(CoreField::Price.key(), price)?,
            tax: validate_amount(CoreField::Tax.key(), tax)?,
            ..CartItem::default()
        })
    }

    /// Creates an item from an attribute map.
    ///
    /// Missing core fields take their defaults (`""`, `1`, `0`, `0`). Every
    /// entry goes through [`CartItem::set`], so the same rules apply: negative
    /// amounts, wrong types and an `id` key are all rejected.
    pub fn from_attributes<I, K>(attributes: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut item = CartItem::default();
        for (key, value) in attributes {
            item.set(key.into(), value)?;
        }
        Ok(item)
    }

    /// Builder-style custom attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> ValidationResult<Self> {
        self.set(key, value)?;
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Identity
    // -------------------------------------------------------------------------

    /// Returns the content hash identifying this line item.
    ///
    /// Stable across processes for equal attributes; ignores quantity.
    pub fn identity(&self) -> &str {
        self.identity.get_or_init(|| self.compute_identity())
    }

    fn compute_identity(&self) -> String {
        let mut fields: Map<String, Value> = Map::new();
        let mut ordered: BTreeMap<&str, Value> = self
            .custom
            .iter()
            .map(|(key, value)| (key.as_str(), canonicalize(value)))
            .collect();
        ordered.insert(CoreField::Name.key(), Value::from(self.name.as_str()));
        ordered.insert(CoreField::Price.key(), Value::from(self.price));
        ordered.insert(CoreField::Tax.key(), Value::from(self.tax));
        for (key, value) in ordered {
            fields.insert(key.to_string(), value);
        }

        let mut hasher = Sha256::new();
        hasher.update(Value::Object(fields).to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn invalidate_identity(&mut self) {
        self.identity = OnceCell::new();
    }

    // -------------------------------------------------------------------------
    // Typed accessors
    // -------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn tax(&self) -> f64 {
        self.tax
    }

    /// Extension attributes only (no core fields).
    pub fn custom_attributes(&self) -> &BTreeMap<String, Value> {
        &self.custom
    }

    /// Sets the quantity. Does not change the identity.
    pub fn set_quantity(&mut self, quantity: i64) -> ValidationResult<()> {
        self.quantity = validate_quantity(quantity)?;
        Ok(())
    }

    /// Adds another line's quantity to this one. Both are non-negative, so
    /// the sum is too.
    pub(crate) fn merge_quantity(&mut self, quantity: i64) {
        self.quantity = self.quantity.saturating_add(quantity);
    }

    pub fn set_price(&mut self, price: f64) -> ValidationResult<()> {
        self.price = validate_amount(CoreField::Price.key(), price)?;
        self.invalidate_identity();
        Ok(())
    }

    pub fn set_tax(&mut self, tax: f64) -> ValidationResult<()> {
        self.tax = validate_amount(CoreField::Tax.key(), tax)?;
        self.invalidate_identity();
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ValidationResult<()> {
        self.name = name.into();
        self.invalidate_identity();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Generic attribute bag
    // -------------------------------------------------------------------------

    /// Reads any attribute, including the core fields and `id`.
    pub fn get(&self, key: &str) -> Option<Value> {
        if key == ID_KEY {
            return Some(Value::from(self.identity()));
        }

        match CoreField::from_key(key) {
            Some(CoreField::Name) => Some(Value::from(self.name.as_str())),
            Some(CoreField::Quantity) => Some(Value::from(self.quantity)),
            Some(CoreField::Price) => Some(Value::from(self.price)),
            Some(CoreField::Tax) => Some(Value::from(self.tax)),
            None => self.custom.get(key).cloned(),
        }
    }

    /// Returns true if the attribute exists. Core fields and `id` always do.
    pub fn has(&self, key: &str) -> bool {
        key == ID_KEY || CoreField::from_key(key).is_some() || self.custom.contains_key(key)
    }

    /// Writes any attribute.
    ///
    /// ## Errors
    /// - `ReadOnly` for `id`
    /// - `WrongType` / `Negative` / `NotFinite` for bad core field values
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> ValidationResult<()> {
        let key = key.into();
        let value = value.into();

        if key == ID_KEY {
            return Err(ValidationError::ReadOnly { field: key });
        }

        match CoreField::from_key(&key) {
            Some(CoreField::Name) => self.set_name(name_from_value(&value)?),
            Some(CoreField::Quantity) => self.set_quantity(quantity_from_value(&value)?),
            Some(CoreField::Price) => self.set_price(amount_from_value(&key, &value)?),
            Some(CoreField::Tax) => self.set_tax(amount_from_value(&key, &value)?),
            None => {
                self.custom.insert(key, value);
                self.invalidate_identity();
                Ok(())
            }
        }
    }

    /// Removes a custom attribute and returns its previous value.
    ///
    /// ## Errors
    /// `NotRemovable` for the core fields and `id`.
    pub fn remove(&mut self, key: &str) -> ValidationResult<Option<Value>> {
        if key == ID_KEY || CoreField::from_key(key).is_some() {
            return Err(ValidationError::NotRemovable {
                field: key.to_string(),
            });
        }

        let removed = self.custom.remove(key);
        if removed.is_some() {
            self.invalidate_identity();
        }
        Ok(removed)
    }

    /// Every attribute except `id`, core fields included.
    pub fn attributes(&self) -> Map<String, Value> {
        let mut attributes: Map<String, Value> = self
            .custom
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for field in CoreField::ALL {
            if let Some(value) = self.get(field.key()) {
                attributes.insert(field.key().to_string(), value);
            }
        }
        attributes
    }

    // -------------------------------------------------------------------------
    // Derived pricing
    // -------------------------------------------------------------------------

    /// Unit price including tax.
    pub fn single_price(&self) -> f64 {
        self.price + self.tax
    }

    pub fn single_price_excluding_tax(&self) -> f64 {
        self.price
    }

    pub fn single_tax(&self) -> f64 {
        self.tax
    }

    /// Line total including tax: `(price + tax) * quantity`.
    pub fn total_price(&self) -> f64 {
        self.single_price() * self.quantity as f64
    }

    pub fn total_price_excluding_tax(&self) -> f64 {
        self.price * self.quantity as f64
    }

    pub fn total_tax(&self) -> f64 {
        self.tax * self.quantity as f64
    }

    // -------------------------------------------------------------------------
    // Copy & snapshot
    // -------------------------------------------------------------------------

    /// Independent copy with identical attributes (and identity).
    pub fn copy(&self) -> CartItem {
        self.clone()
    }

    /// Structural snapshot for persistence.
    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            identity: self.identity().to_string(),
            attributes: self.attributes(),
        }
    }
}

/// Rebuilds nested objects with sorted keys so the hash input does not depend
/// on how serde_json orders maps.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(key, value)| (key, canonicalize(value))).collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(key, value)| (key.clone(), value))
                    .collect(),
            )
        }
        Value::Array(values) => Value::Array(values.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget() -> CartItem {
        CartItem::new("Widget", 10.0, 1.0, 2).unwrap()
    }

    #[test]
    fn test_defaults_from_empty_attributes() {
        let item = CartItem::from_attributes(Vec::<(String, Value)>::new()).unwrap();
        assert_eq!(item.name(), "");
        assert_eq!(item.quantity(), 1);
        assert_eq!(item.price(), 0.0);
        assert_eq!(item.tax(), 0.0);
    }

    #[test]
    fn test_from_attributes_rejects_negative_and_id() {
        let negative = CartItem::from_attributes([("price", json!(-1.0))]);
        assert!(matches!(negative, Err(ValidationError::Negative { .. })));

        let with_id = CartItem::from_attributes([("id", json!("abc"))]);
        assert!(matches!(with_id, Err(ValidationError::ReadOnly { .. })));
    }

    #[test]
    fn test_identity_ignores_quantity() {
        let one = CartItem::new("Widget", 10.0, 1.0, 1).unwrap();
        let five = CartItem::new("Widget", 10.0, 1.0, 5).unwrap();
        assert_eq!(one.identity(), five.identity());
        assert_eq!(one.identity().len(), 64);
    }

    #[test]
    fn test_negative_zero_price_shares_identity() {
        let zero = CartItem::new("Sample", 0.0, 0.0, 1).unwrap();
        let negative_zero = CartItem::new("Sample", -0.0, -0.0, 1).unwrap();
        assert_eq!(zero.identity(), negative_zero.identity());

        let mut via_set = CartItem::new("Sample", 1.0, 0.0, 1).unwrap();
        via_set.set("price", -0.0).unwrap();
        assert_eq!(via_set.identity(), zero.identity());
    }

    #[test]
    fn test_identity_depends_on_other_attributes() {
        let plain = widget();
        let red = widget().with_attribute("colour", "red").unwrap();
        let pricier = CartItem::new("Widget", 11.0, 1.0, 2).unwrap();

        assert_ne!(plain.identity(), red.identity());
        assert_ne!(plain.identity(), pricier.identity());
    }

    #[test]
    fn test_identity_independent_of_attribute_order() {
        let a = CartItem::from_attributes([
            ("name", json!("Shirt")),
            ("size", json!("M")),
            ("colour", json!("blue")),
        ])
        .unwrap();
        let b = CartItem::from_attributes([
            ("colour", json!("blue")),
            ("size", json!("M")),
            ("name", json!("Shirt")),
        ])
        .unwrap();
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn test_identity_cache_invalidation() {
        let mut item = widget();
        let before = item.identity().to_string();

        item.set_quantity(7).unwrap();
        assert_eq!(item.identity(), before);

        item.set_price(12.0).unwrap();
        assert_ne!(item.identity(), before);

        let after_price = item.identity().to_string();
        item.set("sku", "W-1").unwrap();
        assert_ne!(item.identity(), after_price);
    }

    #[test]
    fn test_negative_setters_leave_value_unchanged() {
        let mut item = widget();

        assert!(item.set_price(-1.0).is_err());
        assert!(item.set_tax(-0.5).is_err());
        assert!(item.set_quantity(-3).is_err());
        assert!(item.set("price", -2).is_err());

        assert_eq!(item.price(), 10.0);
        assert_eq!(item.tax(), 1.0);
        assert_eq!(item.quantity(), 2);
    }

    #[test]
    fn test_generic_accessors() {
        let mut item = widget();

        assert_eq!(item.get("name"), Some(json!("Widget")));
        assert_eq!(item.get("quantity"), Some(json!(2)));
        assert_eq!(item.get("id"), Some(json!(item.identity())));
        assert_eq!(item.get("sku"), None);
        assert!(item.has("price"));
        assert!(!item.has("sku"));

        item.set("sku", "W-1").unwrap();
        assert!(item.has("sku"));
        assert_eq!(item.remove("sku").unwrap(), Some(json!("W-1")));
        assert!(!item.has("sku"));

        item.set("quantity", 4).unwrap();
        assert_eq!(item.quantity(), 4);
    }

    #[test]
    fn test_id_and_core_fields_are_protected() {
        let mut item = widget();

        assert!(matches!(item.set("id", "x"), Err(ValidationError::ReadOnly { .. })));
        for key in ["name", "quantity", "price", "tax", "id"] {
            assert!(matches!(
                item.remove(key),
                Err(ValidationError::NotRemovable { .. })
            ));
        }
        assert!(matches!(
            item.set("name", 5),
            Err(ValidationError::WrongType { .. })
        ));
    }

    #[test]
    fn test_derived_pricing() {
        let item = widget();
        assert_eq!(item.single_price(), 11.0);
        assert_eq!(item.single_price_excluding_tax(), 10.0);
        assert_eq!(item.single_tax(), 1.0);
        assert_eq!(item.total_price_excluding_tax(), 20.0);
        assert_eq!(item.total_tax(), 2.0);
        assert_eq!(item.total_price(), 22.0);
    }

    #[test]
    fn test_copy_is_independent() {
        let original = widget().with_attribute("sku", "W-1").unwrap();
        let mut copy = original.copy();

        assert_eq!(copy.identity(), original.identity());
        assert_eq!(copy.attributes(), original.attributes());

        copy.set_quantity(9).unwrap();
        copy.set("sku", "W-2").unwrap();
        assert_eq!(original.quantity(), 2);
        assert_eq!(original.get("sku"), Some(json!("W-1")));
    }

    #[test]
    fn test_snapshot_rebuilds_equivalent_item() {
        let item = widget().with_attribute("category", "tools").unwrap();
        let snapshot = item.snapshot();

        assert!(!snapshot.attributes.contains_key("id"));
        let rebuilt = CartItem::from_attributes(snapshot.attributes.clone()).unwrap();
        assert_eq!(rebuilt.identity(), snapshot.identity);
        assert_eq!(rebuilt.quantity(), 2);
        assert_eq!(rebuilt.get("category"), Some(json!("tools")));
    }
}
