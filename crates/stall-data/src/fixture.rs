//! In-process [`ShopApi`] backed by an inline list or a JSON file.

use std::cell::RefCell;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use stall_commerce::product::total_price;
use stall_commerce::{OrderId, Product};
use tracing::{debug, info, warn};

use crate::api::ShopApi;
use crate::error::{ApiError, ApiResult};
use crate::wire::{parse_catalog, OrderRequest, ProductListResponse, Receipt};

#[derive(Debug, Clone)]
enum CatalogSource {
    Inline(Vec<Product>),
    File(PathBuf),
    Unavailable(String),
}

/// A local stand-in for the shop API.
///
/// Orders are checked the way the server checks them: every item must exist
/// and be for sale, and the total must match the catalog prices.
#[derive(Debug)]
pub struct FixtureApi {
    source: CatalogSource,
    rejection: Option<String>,
    submitted: RefCell<Vec<OrderRequest>>,
}

impl FixtureApi {
    /// Serve a fixed product list.
    pub fn new(items: Vec<Product>) -> Self {
        Self::with_source(CatalogSource::Inline(items))
    }

    /// Serve a product list body, validated up front.
    pub fn from_json(body: &str) -> ApiResult<Self> {
        Ok(Self::new(parse_catalog(body.as_bytes())?))
    }

    /// Serve a product list file, read on every fetch.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_source(CatalogSource::File(path.into()))
    }

    /// An API whose catalog fetch always fails with a network error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::with_source(CatalogSource::Unavailable(reason.into()))
    }

    fn with_source(source: CatalogSource) -> Self {
        Self {
            source,
            rejection: None,
            submitted: RefCell::new(Vec::new()),
        }
    }

    /// Reject every order with a server message.
    pub fn rejecting_orders(mut self, message: impl Into<String>) -> Self {
        self.rejection = Some(message.into());
        self
    }

    /// Orders received so far, accepted or not.
    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.submitted.borrow().clone()
    }

    /// Render the current catalog as a list response.
    pub fn list_response(&self) -> ApiResult<ProductListResponse> {
        Ok(ProductListResponse::new(self.load()?))
    }

    fn load(&self) -> ApiResult<Vec<Product>> {
        match &self.source {
            CatalogSource::Inline(items) => Ok(items.clone()),
            CatalogSource::File(path) => {
                let body = std::fs::read(path).map_err(|e| {
                    ApiError::Network(format!("failed to read {}: {}", path.display(), e))
                })?;
                parse_catalog(&body)
            }
            CatalogSource::Unavailable(reason) => Err(ApiError::Network(reason.clone())),
        }
    }

    fn check_order(&self, order: &OrderRequest) -> ApiResult<()> {
        if let Some(message) = &self.rejection {
            return Err(ApiError::RejectedOrder {
                message: message.clone(),
            });
        }
        if order.items.is_empty() {
            return Err(ApiError::RejectedOrder {
                message: "no items in order".to_string(),
            });
        }

        let catalog = self.load()?;
        let mut ordered = Vec::with_capacity(order.items.len());
        for id in &order.items {
            let product = catalog.iter().find(|p| &p.id == id).ok_or_else(|| {
                ApiError::RejectedOrder {
                    message: format!("product {} not found", id),
                }
            })?;
            if !product.is_for_sale() {
                return Err(ApiError::RejectedOrder {
                    message: format!("product {} is not for sale", id),
                });
            }
            ordered.push(product);
        }

        let expected = total_price(ordered);
        if expected != order.total {
            return Err(ApiError::RejectedOrder {
                message: format!("wrong total: expected {}, got {}", expected, order.total),
            });
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl ShopApi for FixtureApi {
    async fn fetch_catalog(&self) -> ApiResult<Vec<Product>> {
        let items = self.load()?;
        debug!(count = items.len(), "fixture catalog served");
        Ok(items)
    }

    async fn submit_order(&self, order: &OrderRequest) -> ApiResult<Receipt> {
        self.submitted.borrow_mut().push(order.clone());

        if let Err(e) = self.check_order(order) {
            warn!(error = %e, "fixture order refused");
            return Err(e);
        }

        let receipt = Receipt {
            id: OrderId::generate(),
            total: order.total,
            accepted_at: Some(Utc::now()),
        };
        info!(order_id = %receipt.id, total = receipt.total, "fixture order accepted");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use stall_commerce::buyer::BuyerState;

    fn products() -> Vec<Product> {
        vec![
            Product::new("a", "Alpha").with_price(Some(100)),
            Product::new("b", "Beta"),
            Product::new("c", "Gamma").with_price(Some(50)),
        ]
    }

    fn buyer() -> BuyerState {
        BuyerState {
            payment: "card".to_string(),
            email: "x@y.com".to_string(),
            phone: "123".to_string(),
            address: "addr".to_string(),
        }
    }

    #[test]
    fn test_fetch_catalog() {
        let api = FixtureApi::new(products());
        let items = block_on(api.fetch_catalog()).unwrap();
        assert_eq!(items, products());
    }

    #[test]
    fn test_unavailable_catalog() {
        let api = FixtureApi::unavailable("offline");
        assert_eq!(
            block_on(api.fetch_catalog()),
            Err(ApiError::Network("offline".to_string()))
        );
    }

    #[test]
    fn test_missing_file_is_network_error() {
        let api = FixtureApi::from_path("/nonexistent/stall/catalog.json");
        let err = block_on(api.fetch_catalog()).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_accepts_consistent_order() {
        let api = FixtureApi::new(products());
        let order = OrderRequest::new(&buyer(), 150, vec!["a".into(), "c".into()]);

        let receipt = block_on(api.submit_order(&order)).unwrap();
        assert_eq!(receipt.total, 150);
        assert!(receipt.accepted_at.is_some());
        assert_eq!(api.submitted_orders(), vec![order]);
    }

    #[test]
    fn test_rejects_priceless_item() {
        let api = FixtureApi::new(products());
        let order = OrderRequest::new(&buyer(), 100, vec!["a".into(), "b".into()]);

        assert_eq!(
            block_on(api.submit_order(&order)),
            Err(ApiError::RejectedOrder {
                message: "product b is not for sale".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_wrong_total() {
        let api = FixtureApi::new(products());
        let order = OrderRequest::new(&buyer(), 99, vec!["a".into()]);

        let err = block_on(api.submit_order(&order)).unwrap_err();
        assert!(matches!(err, ApiError::RejectedOrder { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_configured_rejection() {
        let api = FixtureApi::new(products()).rejecting_orders("shop closed");
        let order = OrderRequest::new(&buyer(), 100, vec!["a".into()]);

        assert_eq!(
            block_on(api.submit_order(&order)),
            Err(ApiError::RejectedOrder {
                message: "shop closed".to_string()
            })
        );
        assert_eq!(api.submitted_orders().len(), 1);
    }
}
