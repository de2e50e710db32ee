//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in storefront model operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Product not found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product has no price and cannot be bought.
    #[error("Product is not for sale: {0}")]
    NotForSale(String),

    /// Field name outside payment/email/phone/address.
    #[error("Unknown buyer field: {0}")]
    UnknownField(String),
}
