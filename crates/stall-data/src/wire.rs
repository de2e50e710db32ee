//! Request and response bodies exchanged with the shop API.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stall_commerce::buyer::BuyerState;
use stall_commerce::{OrderId, Product, ProductId};
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Body of the product list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListResponse {
    /// Number of products the server reports.
    pub total: u64,
    /// Products in server order.
    pub items: Vec<Product>,
}

impl ProductListResponse {
    /// Wrap a product list, deriving `total` from its length.
    pub fn new(items: Vec<Product>) -> Self {
        Self {
            total: items.len() as u64,
            items,
        }
    }
}

/// Body of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderRequest {
    pub payment: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Sum of item prices at submit time.
    pub total: u64,
    /// Ids of the ordered products, in basket order.
    pub items: Vec<ProductId>,
}

impl OrderRequest {
    /// Build a request from the buyer fields and the basket.
    pub fn new(buyer: &BuyerState, total: u64, items: Vec<ProductId>) -> Self {
        Self {
            payment: buyer.payment.clone(),
            email: buyer.email.clone(),
            phone: buyer.phone.clone(),
            address: buyer.address.clone(),
            total,
            items,
        }
    }
}

/// Server acknowledgement of an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Server-assigned order id.
    pub id: OrderId,
    /// Amount charged.
    pub total: u64,
    /// When the server accepted the order, if it says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Parse a product list body.
///
/// Duplicate product ids make the whole response malformed.
pub fn parse_catalog(body: &[u8]) -> ApiResult<Vec<Product>> {
    let response: ProductListResponse = serde_json::from_slice(body)?;

    let mut seen = HashSet::with_capacity(response.items.len());
    for product in &response.items {
        if !seen.insert(&product.id) {
            return Err(ApiError::MalformedResponse(format!(
                "duplicate product id: {}",
                product.id
            )));
        }
    }

    if response.total != response.items.len() as u64 {
        debug!(
            total = response.total,
            received = response.items.len(),
            "catalog total does not match item count"
        );
    }

    Ok(response.items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "total": 2,
        "items": [
            {"id": "a", "title": "Alpha", "category": "other", "image": "/a.svg", "price": 100},
            {"id": "b", "title": "Beta", "category": "other", "image": "/b.svg", "price": null}
        ]
    }"#;

    #[test]
    fn test_parse_catalog() {
        let items = parse_catalog(CATALOG.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].price, Some(100));
        assert_eq!(items[1].price, None);
    }

    #[test]
    fn test_parse_catalog_schema_mismatch() {
        let err = parse_catalog(br#"{"products": []}"#).unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));

        let err = parse_catalog(b"not json").unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_catalog_rejects_duplicate_ids() {
        let body = r#"{"total": 2, "items": [{"id": "a", "title": "A"}, {"id": "a", "title": "A2"}]}"#;
        assert_eq!(
            parse_catalog(body.as_bytes()),
            Err(ApiError::MalformedResponse("duplicate product id: a".to_string()))
        );
    }

    #[test]
    fn test_order_request_shape() {
        let buyer = BuyerState {
            payment: "card".to_string(),
            email: "x@y.com".to_string(),
            phone: "123".to_string(),
            address: "addr".to_string(),
        };
        let request = OrderRequest::new(&buyer, 100, vec!["a".into(), "b".into()]);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "payment": "card",
                "email": "x@y.com",
                "phone": "123",
                "address": "addr",
                "total": 100,
                "items": ["a", "b"]
            })
        );
    }

    #[test]
    fn test_receipt_timestamp_is_optional() {
        let receipt: Receipt = serde_json::from_str(r#"{"id": "order-1", "total": 100}"#).unwrap();
        assert_eq!(receipt.id.as_str(), "order-1");
        assert_eq!(receipt.total, 100);
        assert_eq!(receipt.accepted_at, None);
    }
}
