//! # Cart Data Transfer Types
//!
//! Read-only views of a cart: the summary handed to callers and the metadata
//! block embedded in persisted blobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Summary
// =============================================================================

/// Cart totals summary for API/CLI responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub id: String,
    pub total_items: i64,
    pub unique_items: usize,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub is_empty: bool,
}

// =============================================================================
// Blob Metadata
// =============================================================================

/// Aggregates written alongside the items of a saved cart.
///
/// Informational only: restore recomputes everything from the items and
/// never reads this block back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartMeta {
    pub total_items: i64,
    pub unique_items: usize,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub is_empty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl From<&CartSummary> for CartMeta {
    fn from(summary: &CartSummary) -> Self {
        CartMeta {
            total_items: summary.total_items,
            unique_items: summary.unique_items,
            subtotal: summary.subtotal,
            tax: summary.tax,
            total: summary.total,
            is_empty: summary.is_empty,
            saved_at: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = CartSummary {
            id: "c1".to_string(),
            total_items: 2,
            unique_items: 1,
            subtotal: 20.0,
            tax: 2.0,
            total: 22.0,
            is_empty: false,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalItems"], 2);
        assert_eq!(json["uniqueItems"], 1);
        assert_eq!(json["isEmpty"], false);
    }

    #[test]
    fn test_meta_omits_missing_saved_at() {
        let summary = CartSummary {
            id: "c1".to_string(),
            total_items: 0,
            unique_items: 0,
            subtotal: 0.0,
            tax: 0.0,
            total: 0.0,
            is_empty: true,
        };
        let json = serde_json::to_value(CartMeta::from(&summary)).unwrap();
        assert!(json.get("savedAt").is_none());
        assert!(json.get("id").is_none());
    }
}
