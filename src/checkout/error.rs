//! Checkout Error Types

use thiserror::Error;

use crate::payment::PaymentError;
use crate::store::StoreError;

/// Fixed body of every 400 response
pub const INVALID_REQUEST_MESSAGE: &str = "Product ids are required";

/// Body of 500 responses that carry no provider message
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Longest provider message forwarded to the caller
const MAX_FORWARDED_MESSAGE_LEN: usize = 200;

/// Checkout error types
///
/// Everything except `InvalidRequest` surfaces as HTTP 500; variants only
/// change the message text and the server-side log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Missing or empty product id list
    #[error("Product ids are required")]
    InvalidRequest,

    /// Catalog or order store failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Provider rejected the payment or answered with an unusable body
    #[error("Payment gateway error: {detail}")]
    Gateway {
        /// Provider's own message, forwarded to the caller when present
        message: Option<String>,
        /// Full diagnostic, logged only
        detail: String,
    },

    /// Could not reach a collaborator (network failure or timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Anything else that stops the flow (e.g. amount overflow)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CheckoutError {
    /// Stable error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            CheckoutError::InvalidRequest => "INVALID_REQUEST",
            CheckoutError::Persistence(_) => "PERSISTENCE_ERROR",
            CheckoutError::Gateway { .. } => "GATEWAY_ERROR",
            CheckoutError::Transport(_) => "TRANSPORT_ERROR",
            CheckoutError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for the response
    pub fn http_status(&self) -> u16 {
        match self {
            CheckoutError::InvalidRequest => 400,
            CheckoutError::Persistence(_)
            | CheckoutError::Gateway { .. }
            | CheckoutError::Transport(_)
            | CheckoutError::Internal(_) => 500,
        }
    }

    /// Message that is safe to show the caller
    pub fn client_message(&self) -> String {
        match self {
            CheckoutError::InvalidRequest => INVALID_REQUEST_MESSAGE.to_string(),
            CheckoutError::Gateway {
                message: Some(m), ..
            } => m.chars().take(MAX_FORWARDED_MESSAGE_LEN).collect(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<PaymentError> for CheckoutError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::Rejected { ref message, .. } => CheckoutError::Gateway {
                message: message.clone(),
                detail: e.to_string(),
            },
            PaymentError::Malformed(_) => CheckoutError::Gateway {
                message: None,
                detail: e.to_string(),
            },
            PaymentError::Transport(cause) => CheckoutError::Transport(cause),
        }
    }
}

impl From<StoreError> for CheckoutError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(cause) => CheckoutError::Transport(cause),
            StoreError::Database(
                ref inner @ (sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_)),
            ) => CheckoutError::Transport(inner.to_string()),
            other => CheckoutError::Persistence(other.to_string()),
        }
    }
}
