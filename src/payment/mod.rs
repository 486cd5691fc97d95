//! Payment provider integration
//!
//! [`PaymentGateway`] is the single seam between checkout and the hosted
//! payment page. The provider outcome is a discriminated result:
//!
//! ```text
//! Ok(PaymentSession)                      -> redirect the shopper
//! Err(PaymentError::Rejected {..})        -> provider answered non-2xx
//! Err(PaymentError::Malformed(..))        -> 2xx but unusable body
//! Err(PaymentError::Transport(..))        -> never got an answer
//! ```

pub mod moyasar;

pub use moyasar::MoyasarGateway;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::money::MinorUnits;

/// Metadata key carrying the order id to the provider
pub const METADATA_ORDER_ID: &str = "orderId";

/// Payment request built per checkout and discarded after the call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntent {
    /// Amount in minor units (halalas)
    pub amount: MinorUnits,
    /// ISO 4217 code, e.g. "SAR"
    pub currency: String,
    pub description: String,
    /// Where the provider sends the shopper after payment
    pub callback_url: String,
    pub metadata: BTreeMap<String, String>,
    /// Ask the provider to tokenize the card for later use
    pub save_card: bool,
    /// Optional storefront return pair (success/cancel)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_urls: Option<ReturnUrls>,
}

impl PaymentIntent {
    /// Order id recorded in metadata, if any
    pub fn order_id(&self) -> Option<&str> {
        self.metadata.get(METADATA_ORDER_ID).map(String::as_str)
    }
}

/// Client-side redirect targets after the hosted page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnUrls {
    pub success_url: String,
    pub cancel_url: String,
}

/// Hosted payment session opened by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    /// Hosted payment page the shopper is sent to
    pub redirect_url: String,
    /// Provider-side payment id, when reported
    pub payment_id: Option<String>,
}

/// Provider outcome other than a usable session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Provider responded with a non-2xx status
    #[error("Payment provider rejected the request (HTTP {status})")]
    Rejected {
        status: u16,
        /// Provider's own human-readable message, when it sent one
        message: Option<String>,
    },

    /// 2xx response that does not carry a redirect URL
    #[error("Malformed payment provider response: {0}")]
    Malformed(String),

    /// Network failure or timeout
    #[error("Payment provider unreachable: {0}")]
    Transport(String),
}

/// Hosted-payment provider
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Open a hosted payment session for the intent
    async fn create_payment_session(
        &self,
        intent: &PaymentIntent,
    ) -> Result<PaymentSession, PaymentError>;
}
