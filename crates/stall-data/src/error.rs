//! API error types.

use thiserror::Error;

/// Errors returned by a [`ShopApi`](crate::ShopApi) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The response did not match the expected schema.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The server refused the order.
    #[error("Order rejected: {message}")]
    RejectedOrder { message: String },
}

impl ApiError {
    /// Check if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::MalformedResponse(e.to_string())
    }
}

/// Result alias for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
