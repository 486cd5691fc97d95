//! Moyasar payment gateway
//!
//! Opens a hosted payment via `POST {api_base}/v1/payments` and returns the
//! `url` the shopper must visit. Responses are treated as untrusted: a 2xx
//! without a usable URL is reported as [`PaymentError::Malformed`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{PaymentError, PaymentGateway, PaymentIntent, PaymentSession};
use crate::config::{AuthScheme, PaymentConfig};

/// Request body for Moyasar's create-payment endpoint
#[derive(Serialize)]
struct CreatePaymentRequest<'a> {
    amount: i64,
    currency: &'a str,
    description: &'a str,
    callback_url: &'a str,
    metadata: &'a std::collections::BTreeMap<String, String>,
    credit_card: CreditCardOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    success_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancel_url: Option<&'a str>,
}

#[derive(Serialize)]
struct CreditCardOptions {
    save_card: bool,
}

impl<'a> From<&'a PaymentIntent> for CreatePaymentRequest<'a> {
    fn from(intent: &'a PaymentIntent) -> Self {
        Self {
            amount: intent.amount.get(),
            currency: &intent.currency,
            description: &intent.description,
            callback_url: &intent.callback_url,
            metadata: &intent.metadata,
            credit_card: CreditCardOptions {
                save_card: intent.save_card,
            },
            success_url: intent.return_urls.as_ref().map(|r| r.success_url.as_str()),
            cancel_url: intent.return_urls.as_ref().map(|r| r.cancel_url.as_str()),
        }
    }
}

/// Success body (only the fields we read)
#[derive(Deserialize)]
struct CreatePaymentResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    source: Option<PaymentSource>,
}

#[derive(Deserialize)]
struct PaymentSource {
    #[serde(default)]
    transaction_url: Option<String>,
}

/// Error body: `{"type": "...", "message": "...", "errors": {...}}`
#[derive(Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Moyasar REST client
pub struct MoyasarGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    auth_scheme: AuthScheme,
}

impl MoyasarGateway {
    /// Create a gateway whose requests give up after `timeout`
    pub fn new(config: &PaymentConfig, timeout: Duration) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/payments", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            auth_scheme: config.auth_scheme,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_scheme {
            AuthScheme::Bearer => request.bearer_auth(&self.api_key),
            // API key as username, empty password
            AuthScheme::Basic => request.basic_auth(&self.api_key, Some("")),
        }
    }
}

/// Pull the provider's message out of an error body, if it sent one
fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<ProviderErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

fn session_from_body(body: &str) -> Result<PaymentSession, PaymentError> {
    let parsed: CreatePaymentResponse = serde_json::from_str(body)
        .map_err(|e| PaymentError::Malformed(format!("invalid JSON: {}", e)))?;

    let redirect_url = parsed
        .url
        .or_else(|| parsed.source.and_then(|s| s.transaction_url))
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| PaymentError::Malformed("missing redirect url".to_string()))?;

    Ok(PaymentSession {
        redirect_url,
        payment_id: parsed.id,
    })
}

#[async_trait]
impl PaymentGateway for MoyasarGateway {
    fn name(&self) -> &'static str {
        "moyasar"
    }

    async fn create_payment_session(
        &self,
        intent: &PaymentIntent,
    ) -> Result<PaymentSession, PaymentError> {
        let body = CreatePaymentRequest::from(intent);

        let response = self
            .authorize(self.client.post(&self.endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !status.is_success() {
            warn!(
                provider = "moyasar",
                status = status.as_u16(),
                body = %text,
                "Payment provider rejected request"
            );
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message: provider_message(&text),
            });
        }

        let session = session_from_body(&text)?;
        debug!(
            provider = "moyasar",
            payment_id = session.payment_id.as_deref().unwrap_or("-"),
            "Payment session opened"
        );
        Ok(session)
    }
}
