use std::sync::Arc;

use axum::http::HeaderValue;

use crate::checkout::CheckoutOrchestrator;
use crate::config::ConfigError;

/// Gateway application state (shared by all requests)
#[derive(Clone)]
pub struct AppState {
    /// Checkout flow with its catalog, order store and payment provider
    pub orchestrator: Arc<CheckoutOrchestrator>,
    /// `Access-Control-Allow-Origin` value sent on every response
    pub cors_allow_origin: HeaderValue,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<CheckoutOrchestrator>,
        cors_allow_origin: &str,
    ) -> Result<Self, ConfigError> {
        let cors_allow_origin = HeaderValue::from_str(cors_allow_origin).map_err(|_| {
            ConfigError::Invalid(format!("cors_allow_origin {:?}", cors_allow_origin))
        })?;

        Ok(Self {
            orchestrator,
            cors_allow_origin,
        })
    }
}
