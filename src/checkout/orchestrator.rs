//! Checkout Orchestrator
//!
//! Drives one checkout from a list of product ids to a hosted payment URL.
//! Two phases:
//!
//! 1. **Reserve**: resolve prices, compute the amount, persist an unpaid order.
//! 2. **Open payment**: ask the provider for a session linked to that order.
//!
//! Phase two never undoes phase one. An order whose payment session could not
//! be opened stays unpaid in the store and is logged with its id so the
//! reconciliation job can sweep it.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tracing::{debug, error, info, warn};

use super::error::CheckoutError;
use crate::config::{CheckoutConfig, ConfigError};
use crate::core_types::{OrderId, ProductId, StoreId};
use crate::models::{NewOrderItem, Order};
use crate::money::{self, MinorUnits};
use crate::payment::{METADATA_ORDER_ID, PaymentGateway, PaymentIntent, ReturnUrls};
use crate::store::{OrderStore, ProductCatalog};

/// Storefront URLs handed to the provider
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    callback_base: Url,
    success_url: String,
    cancel_url: String,
}

impl CheckoutUrls {
    /// Derive all URLs from the storefront base, e.g. `https://shop.example`
    pub fn new(frontend_store_url: &str) -> Result<Self, ConfigError> {
        let base = Url::parse(frontend_store_url).map_err(|e| {
            ConfigError::Invalid(format!("frontend store url {:?}: {}", frontend_store_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "frontend store url {:?} cannot be a base",
                frontend_store_url
            )));
        }

        let callback_base = with_path(&base, "payment-callback", &[])?;
        let success_url = with_path(&base, "cart", &[("success", "1")])?.to_string();
        let cancel_url = with_path(&base, "cart", &[("canceled", "1")])?.to_string();

        Ok(Self {
            callback_base,
            success_url,
            cancel_url,
        })
    }

    /// `{frontend}/payment-callback?orderId={order_id}`
    pub fn callback_url(&self, order_id: &OrderId) -> String {
        let mut url = self.callback_base.clone();
        url.query_pairs_mut()
            .append_pair(METADATA_ORDER_ID, order_id.as_str());
        url.to_string()
    }

    pub fn return_urls(&self) -> ReturnUrls {
        ReturnUrls {
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
        }
    }
}

fn with_path(base: &Url, segment: &str, query: &[(&str, &str)]) -> Result<Url, ConfigError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| ConfigError::Invalid(format!("{} cannot be a base", base)))?
        .pop_if_empty()
        .push(segment);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// Per-deployment checkout settings, fixed at start-up
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub urls: CheckoutUrls,
    pub currency: String,
    pub description: String,
    pub save_card: bool,
    pub include_return_urls: bool,
    /// Bound applied to every collaborator call
    pub timeout: Duration,
}

impl CheckoutSettings {
    pub fn from_config(config: &CheckoutConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            urls: CheckoutUrls::new(&config.frontend_store_url)?,
            currency: config.currency.clone(),
            description: config.description.clone(),
            save_card: config.save_card,
            include_return_urls: config.include_return_urls,
            timeout: config.collaborator_timeout(),
        })
    }
}

/// Result of a successful checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    /// Hosted payment page, returned verbatim from the provider
    pub redirect_url: String,
    pub order_id: OrderId,
    pub amount: MinorUnits,
}

/// Output of phase one: a persisted unpaid order and its amount
#[derive(Debug, Clone)]
pub struct PendingCheckout {
    pub order: Order,
    pub amount: MinorUnits,
}

/// Checkout orchestrator - one instance shared by all requests
pub struct CheckoutOrchestrator {
    catalog: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
}

impl CheckoutOrchestrator {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            catalog,
            orders,
            gateway,
            settings,
        }
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    pub fn order_store(&self) -> &Arc<dyn OrderStore> {
        &self.orders
    }

    /// Price the cart, record an unpaid order and open a payment session.
    ///
    /// `None` and an empty list are both rejected before any collaborator is
    /// touched. Not idempotent: every call creates a new order.
    pub async fn initiate_checkout(
        &self,
        store_id: &StoreId,
        product_ids: Option<&[ProductId]>,
    ) -> Result<CheckoutSession, CheckoutError> {
        let product_ids = match product_ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => return Err(CheckoutError::InvalidRequest),
        };

        let pending = self.reserve_order(store_id, product_ids).await?;

        match self.open_payment(&pending).await {
            Ok(session) => Ok(session),
            Err(e) => {
                warn!(
                    order_id = %pending.order.id,
                    store_id = %store_id,
                    amount = %pending.amount,
                    code = e.code(),
                    "Payment session failed; unpaid order retained for reconciliation"
                );
                Err(e)
            }
        }
    }

    /// Phase one: resolve products, compute the amount, persist the order.
    pub async fn reserve_order(
        &self,
        store_id: &StoreId,
        product_ids: &[ProductId],
    ) -> Result<PendingCheckout, CheckoutError> {
        if product_ids.is_empty() {
            return Err(CheckoutError::InvalidRequest);
        }

        let products = self
            .bounded("catalog lookup", self.catalog.find_by_ids(product_ids))
            .await
            .inspect_err(|e| error!(store_id = %store_id, error = %e, "Catalog lookup failed"))?;

        if products.len() < product_ids.len() {
            debug!(
                store_id = %store_id,
                requested = product_ids.len(),
                resolved = products.len(),
                "Some product ids did not resolve"
            );
        }

        let total = money::sum_prices(products.iter().map(|p| &p.price))
            .map_err(|e| CheckoutError::Internal(e.to_string()))?;
        let amount =
            money::to_minor_units(total).map_err(|e| CheckoutError::Internal(e.to_string()))?;

        // One item per requested id, resolved or not
        let items: Vec<NewOrderItem> = product_ids
            .iter()
            .cloned()
            .map(NewOrderItem::new)
            .collect();

        let order = self
            .bounded("order creation", self.orders.create(store_id, &items))
            .await
            .inspect_err(|e| error!(store_id = %store_id, error = %e, "Order creation failed"))?;

        info!(
            order_id = %order.id,
            store_id = %store_id,
            items = order.items.len(),
            amount = %money::format_minor_units(amount),
            "Pending order created"
        );

        Ok(PendingCheckout { order, amount })
    }

    /// Phase two: open the hosted payment session for a pending order.
    pub async fn open_payment(
        &self,
        pending: &PendingCheckout,
    ) -> Result<CheckoutSession, CheckoutError> {
        let intent = self.build_intent(&pending.order.id, pending.amount);

        let session = self
            .bounded(
                "payment session",
                self.gateway.create_payment_session(&intent),
            )
            .await
            .inspect_err(|e| {
                error!(
                    order_id = %pending.order.id,
                    provider = self.gateway.name(),
                    error = %e,
                    "Payment session creation failed"
                )
            })?;

        info!(
            order_id = %pending.order.id,
            provider = self.gateway.name(),
            payment_id = session.payment_id.as_deref().unwrap_or("-"),
            "Payment session opened"
        );

        Ok(CheckoutSession {
            redirect_url: session.redirect_url,
            order_id: pending.order.id.clone(),
            amount: pending.amount,
        })
    }

    /// Build the provider request for an order
    pub fn build_intent(&self, order_id: &OrderId, amount: MinorUnits) -> PaymentIntent {
        let mut metadata = BTreeMap::new();
        metadata.insert(METADATA_ORDER_ID.to_string(), order_id.to_string());

        PaymentIntent {
            amount,
            currency: self.settings.currency.clone(),
            description: self.settings.description.clone(),
            callback_url: self.settings.urls.callback_url(order_id),
            metadata,
            save_card: self.settings.save_card,
            return_urls: self
                .settings
                .include_return_urls
                .then(|| self.settings.urls.return_urls()),
        }
    }

    /// Run a collaborator call under the configured timeout
    async fn bounded<T, E, F>(&self, what: &'static str, call: F) -> Result<T, CheckoutError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<CheckoutError>,
    {
        match tokio::time::timeout(self.settings.timeout, call).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(CheckoutError::Transport(format!(
                "{} timed out after {} ms",
                what,
                self.settings.timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_url_embeds_order_id() {
        let urls = CheckoutUrls::new("https://shop.example").unwrap();
        let id = OrderId::from("ord-42");
        assert_eq!(
            urls.callback_url(&id),
            "https://shop.example/payment-callback?orderId=ord-42"
        );
    }

    #[test]
    fn test_return_urls() {
        let urls = CheckoutUrls::new("https://shop.example/").unwrap();
        let r = urls.return_urls();
        assert_eq!(r.success_url, "https://shop.example/cart?success=1");
        assert_eq!(r.cancel_url, "https://shop.example/cart?canceled=1");
    }

    #[test]
    fn test_urls_keep_base_path() {
        let urls = CheckoutUrls::new("https://example.com/store-a/").unwrap();
        assert_eq!(
            urls.callback_url(&OrderId::from("x")),
            "https://example.com/store-a/payment-callback?orderId=x"
        );

        let urls = CheckoutUrls::new("https://example.com/store-b").unwrap();
        assert_eq!(
            urls.return_urls().cancel_url,
            "https://example.com/store-b/cart?canceled=1"
        );
    }

    #[test]
    fn test_callback_url_encodes_order_id() {
        let urls = CheckoutUrls::new("https://shop.example").unwrap();
        assert_eq!(
            urls.callback_url(&OrderId::from("a&b")),
            "https://shop.example/payment-callback?orderId=a%26b"
        );
    }

    #[test]
    fn test_invalid_frontend_url() {
        assert!(CheckoutUrls::new("").is_err());
        assert!(CheckoutUrls::new("mailto:shop@example.com").is_err());
    }
}
