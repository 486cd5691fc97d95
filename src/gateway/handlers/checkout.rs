//! Checkout handlers

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::debug;

use super::super::state::AppState;
use super::super::types::{ApiError, CheckoutRequest, CheckoutResponse, ErrorBody};
use crate::checkout::CheckoutError;
use crate::core_types::StoreId;

/// CORS preflight; headers are added by the middleware
pub async fn checkout_preflight() -> StatusCode {
    StatusCode::OK
}

/// Start a checkout
///
/// Persists an unpaid order for the cart and returns the hosted payment URL.
/// The body is parsed as JSON whatever its `Content-Type`, so browser
/// "simple" `text/plain` posts work. A body that is not valid JSON is
/// treated like a missing `productIds`.
#[utoipa::path(
    post,
    path = "/{store_id}/checkout",
    params(
        ("store_id" = String, Path, description = "Store the order belongs to")
    ),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Payment session opened", body = CheckoutResponse),
        (status = 400, description = "Product ids are required", body = String, content_type = "text/plain"),
        (status = 500, description = "Checkout failed", body = ErrorBody)
    ),
    tag = "Checkout"
)]
pub async fn create_checkout(
    State(state): State<Arc<AppState>>,
    Path(store_id): Path<StoreId>,
    body: Bytes,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let request: CheckoutRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(store_id = %store_id, error = %e, "Rejected checkout body");
        ApiError::from(CheckoutError::InvalidRequest)
    })?;

    let session = state
        .orchestrator
        .initiate_checkout(&store_id, request.product_ids.as_deref())
        .await?;

    Ok(Json(CheckoutResponse {
        url: session.redirect_url,
    }))
}
