//! # Validation Module
//!
//! Attribute validation for cart line items.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Single Mutation Path                               │
//! │                                                                         │
//! │  item.set_price(x) ─────────┐                                          │
//! │                             ├──► validate_amount("price", x) ──► store │
//! │  item.set("price", json) ───┘       ▲                                  │
//! │        │                            │                                  │
//! │        └── amount_from_value ───────┘  (type coercion first)           │
//! │                                                                         │
//! │  Any failure returns before the field is touched.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use basket_core::validation::{validate_amount, validate_quantity};
//!
//! assert!(validate_amount("price", 10.0).is_ok());
//! assert!(validate_amount("tax", -0.5).is_err());
//! assert!(validate_quantity(0).is_ok());
//! ```

use serde_json::Value;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a monetary amount (price or tax).
///
/// ## Rules
/// - Must be finite (no NaN / infinity)
/// - Must be non-negative (>= 0); zero is allowed (free items, tax-exempt)
pub fn validate_amount(field: &str, value: f64) -> ValidationResult<f64> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }

    // Folds -0.0 into 0.0 so both hash to the same identity.
    Ok(value + 0.0)
}

/// Validates a quantity value.
///
/// ## Rules
/// - Must be non-negative (>= 0)
///
/// A zero quantity is a valid item state; the cart decides what zero means
/// when it comes through `update_quantity`.
pub fn validate_quantity(qty: i64) -> ValidationResult<i64> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
            value: qty as f64,
        });
    }

    Ok(qty)
}

// =============================================================================
// JSON Coercion
// =============================================================================

/// Reads an amount from a JSON value and validates it.
pub fn amount_from_value(field: &str, value: &Value) -> ValidationResult<f64> {
    let amount = value.as_f64().ok_or_else(|| ValidationError::WrongType {
        field: field.to_string(),
        expected: "a number".to_string(),
    })?;

    validate_amount(field, amount)
}

/// Reads a quantity from a JSON value and validates it.
///
/// Accepts integers and integral floats (`2.0`), since blobs written by other
/// encoders may not preserve the distinction.
pub fn quantity_from_value(value: &Value) -> ValidationResult<i64> {
    let wrong_type = || ValidationError::WrongType {
        field: "quantity".to_string(),
        expected: "an integer".to_string(),
    };

    let qty = match value.as_i64() {
        Some(qty) => qty,
        None => {
            let float = value.as_f64().ok_or_else(wrong_type)?;
            if float.fract() != 0.0 || float.abs() > i64::MAX as f64 {
                return Err(wrong_type());
            }
            float as i64
        }
    };

    validate_quantity(qty)
}

/// Reads a name from a JSON value.
pub fn name_from_value(value: &Value) -> ValidationResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ValidationError::WrongType {
            field: "name".to_string(),
            expected: "a string".to_string(),
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("price", 0.0).is_ok());
        assert!(validate_amount("price", 10.99).is_ok());

        assert!(validate_amount("price", -0.01).is_err());
        assert!(validate_amount("price", f64::NAN).is_err());
        assert!(validate_amount("tax", f64::INFINITY).is_err());
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        let amount = validate_amount("price", -0.0).unwrap();
        assert_eq!(amount, 0.0);
        assert!(amount.is_sign_positive());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999_999).is_ok());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_amount_from_value() {
        assert_eq!(amount_from_value("price", &json!(10)).unwrap(), 10.0);
        assert_eq!(amount_from_value("price", &json!(2.5)).unwrap(), 2.5);
        assert!(matches!(
            amount_from_value("price", &json!("10")),
            Err(ValidationError::WrongType { .. })
        ));
        assert!(matches!(
            amount_from_value("tax", &json!(-1)),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_quantity_from_value() {
        assert_eq!(quantity_from_value(&json!(3)).unwrap(), 3);
        assert_eq!(quantity_from_value(&json!(3.0)).unwrap(), 3);
        assert!(quantity_from_value(&json!(3.5)).is_err());
        assert!(quantity_from_value(&json!(-2)).is_err());
        assert!(quantity_from_value(&json!(null)).is_err());
    }

    #[test]
    fn test_name_from_value() {
        assert_eq!(name_from_value(&json!("Widget")).unwrap(), "Widget");
        assert!(name_from_value(&json!(42)).is_err());
    }
}
