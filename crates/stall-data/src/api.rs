//! The shop API contract.

use std::rc::Rc;

use async_trait::async_trait;
use stall_commerce::Product;

use crate::error::ApiResult;
use crate::wire::{OrderRequest, Receipt};

/// Remote catalog and order service.
///
/// Implementations are used from a single-threaded session, so futures
/// need not be `Send`.
#[async_trait(?Send)]
pub trait ShopApi {
    /// Fetch the product list in server order.
    async fn fetch_catalog(&self) -> ApiResult<Vec<Product>>;

    /// Submit an order.
    async fn submit_order(&self, order: &OrderRequest) -> ApiResult<Receipt>;
}

#[async_trait(?Send)]
impl<T: ShopApi + ?Sized> ShopApi for Rc<T> {
    async fn fetch_catalog(&self) -> ApiResult<Vec<Product>> {
        (**self).fetch_catalog().await
    }

    async fn submit_order(&self, order: &OrderRequest) -> ApiResult<Receipt> {
        (**self).submit_order(order).await
    }
}
