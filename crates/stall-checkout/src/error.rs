//! Checkout error types.

use stall_commerce::CommerceError;
use stall_data::ApiError;
use thiserror::Error;

use crate::step::CheckoutStep;

/// Errors that can occur while handling a storefront intent.
///
/// None of them is fatal. A refused transition leaves the step unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// A gate failed or the intent is not available in the current step.
    #[error("Cannot {intent} from {}: {reason}", .from.as_str())]
    TransitionRefused {
        from: CheckoutStep,
        intent: &'static str,
        reason: &'static str,
    },

    /// The order API failed or refused the order.
    #[error("Order submission failed: {0}")]
    SubmissionFailed(#[source] ApiError),

    /// The product list could not be fetched.
    #[error("Catalog load failed: {0}")]
    CatalogLoadFailed(#[source] ApiError),

    /// The submission task could not be scheduled.
    #[error("Cannot schedule order submission: {0}")]
    SpawnFailed(String),

    /// A model operation failed.
    #[error(transparent)]
    Commerce(#[from] CommerceError),
}

impl CheckoutError {
    /// Check if this is an ordinary gate refusal.
    pub fn is_refusal(&self) -> bool {
        matches!(self, CheckoutError::TransitionRefused { .. })
    }
}

/// Result alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;
