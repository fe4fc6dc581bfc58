//! Fulfillment requests and the rules applied to them.
//!
//! A [`FulfillmentRequest`] is what arrives on the wire. It only becomes a
//! [`Fulfillment`] after [`FulfillmentRequest::validate`] has checked every
//! field, so code holding a `Fulfillment` never re-checks input.

use crate::entities::OrderId;
use crate::value_objects::{Amount, DomainError, ProductId, WarehouseId};
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Request
// =============================================================================

/// Raw fulfillment request as received from a client.
///
/// Missing fields deserialize to their defaults (zero, Unix epoch) and are
/// then rejected by [`validate`](Self::validate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRequest {
    #[serde(default, alias = "idProduct")]
    pub product_id: i32,
    #[serde(default, alias = "idWarehouse")]
    pub warehouse_id: i32,
    #[serde(default)]
    pub amount: i32,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl FulfillmentRequest {
    /// Validate every field and produce a [`Fulfillment`].
    ///
    /// # Errors
    /// Returns the first failing field's `DomainError`.
    pub fn validate(&self) -> Result<Fulfillment, DomainError> {
        let product_id = ProductId::new(self.product_id)?;
        let warehouse_id = WarehouseId::new(self.warehouse_id)?;
        let amount = Amount::new(self.amount)?;

        if self.created_at == DateTime::<Utc>::default() {
            return Err(DomainError::InvalidTimestamp(
                "createdAt is missing or left at its default value".to_string(),
            ));
        }

        Ok(Fulfillment {
            product_id,
            warehouse_id,
            amount,
            created_at: self.created_at,
        })
    }
}

/// Accepts RFC 3339 timestamps and offset-less ones, which are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid createdAt {raw:?}: {e}")))
}

// =============================================================================
// Validated fulfillment
// =============================================================================

/// A validated request to allocate warehouse stock to a matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fulfillment {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Pricing
// =============================================================================

/// Price recorded on a movement: requested amount times ordered amount.
///
/// Neither side carries a unit price, so this is kept as the historical
/// formula rather than a real valuation.
pub fn movement_price(requested: Amount, ordered: Amount) -> Decimal {
    Decimal::from(requested.as_i32()) * Decimal::from(ordered.as_i32())
}

// =============================================================================
// Rejections
// =============================================================================

/// Business reasons a valid fulfillment can be turned down.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// No product row with this id
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),

    /// No warehouse row with this id
    #[error("Warehouse {0} does not exist")]
    WarehouseNotFound(WarehouseId),

    /// No open order for this product and amount placed before the request
    #[error("No open order matches product {product_id} with amount {amount}")]
    NoMatchingOrder {
        /// Requested product
        product_id: ProductId,
        /// Requested amount
        amount: Amount,
    },

    /// The matched order already has an inventory movement
    #[error("Order {0} has already been fulfilled")]
    AlreadyFulfilled(OrderId),
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn valid_request() -> FulfillmentRequest {
        FulfillmentRequest {
            product_id: 1,
            warehouse_id: 2,
            amount: 20,
            created_at: Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_request() {
        let fulfillment = valid_request().validate().unwrap();
        assert_eq!(fulfillment.product_id.as_i32(), 1);
        assert_eq!(fulfillment.warehouse_id.as_i32(), 2);
        assert_eq!(fulfillment.amount.as_i32(), 20);
    }

    #[test]
    fn test_validate_rejects_each_non_positive_field() {
        let mut req = valid_request();
        req.product_id = 0;
        assert_eq!(req.validate(), Err(DomainError::InvalidProductId(0)));

        let mut req = valid_request();
        req.warehouse_id = -1;
        assert_eq!(req.validate(), Err(DomainError::InvalidWarehouseId(-1)));

        let mut req = valid_request();
        req.amount = 0;
        assert_eq!(req.validate(), Err(DomainError::InvalidAmount(0)));
    }

    #[test]
    fn test_validate_rejects_default_timestamp() {
        let mut req = valid_request();
        req.created_at = DateTime::<Utc>::default();
        assert!(matches!(req.validate(), Err(DomainError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_deserialize_missing_fields_fail_validation() {
        let req: FulfillmentRequest = serde_json::from_str(r#"{"productId": 1}"#).unwrap();
        assert_eq!(req.warehouse_id, 0);
        assert!(req.validate().is_err());

        let req: FulfillmentRequest =
            serde_json::from_str(r#"{"productId": 1, "warehouseId": 1, "amount": 5}"#).unwrap();
        assert!(matches!(req.validate(), Err(DomainError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_deserialize_accepts_legacy_names_and_naive_timestamp() {
        let req: FulfillmentRequest = serde_json::from_str(
            r#"{"idProduct": 1, "idWarehouse": 2, "amount": 20, "createdAt": "2024-03-02T12:00:00"}"#,
        )
        .unwrap();

        assert_eq!(req, valid_request());
    }

    #[test]
    fn test_deserialize_rfc3339_with_offset() {
        let req: FulfillmentRequest = serde_json::from_str(
            r#"{"productId": 1, "warehouseId": 2, "amount": 20, "createdAt": "2024-03-02T14:00:00+02:00"}"#,
        )
        .unwrap();

        assert_eq!(req.created_at, valid_request().created_at);
    }

    #[test]
    fn test_deserialize_rejects_garbage_timestamp() {
        let result = serde_json::from_str::<FulfillmentRequest>(
            r#"{"productId": 1, "warehouseId": 2, "amount": 20, "createdAt": "yesterday"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_movement_price_is_product_of_amounts() {
        let requested = Amount::new(20).unwrap();
        let ordered = Amount::new(20).unwrap();
        assert_eq!(movement_price(requested, ordered), dec!(400));
    }

    #[test]
    fn test_rejection_messages() {
        let product = ProductId::new(3).unwrap();
        assert_eq!(Rejection::ProductNotFound(product).to_string(), "Product 3 does not exist");
        assert_eq!(
            Rejection::AlreadyFulfilled(8).to_string(),
            "Order 8 has already been fulfilled"
        );
    }
}
