//! Gateway types module
//!
//! ## Input Types
//! - [`CheckoutRequest`]: checkout body as sent by the storefront
//!
//! ## Output Types
//! - [`CheckoutResponse`]: hosted payment URL
//! - [`ErrorBody`]: `{"error": ...}` body of 500 responses
//! - [`ApiError`]: checkout failure rendered as an HTTP response
//! - [`ApiResponse<T>`]: wrapper used by the system endpoints

pub mod response;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::core_types::ProductId;

pub use response::{ApiError, ApiResponse, CheckoutResponse, ErrorBody};

/// Checkout request body
///
/// `productIds` may be absent or null; the orchestrator rejects both.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(rename = "productIds", default)]
    #[schema(value_type = Option<Vec<String>>, example = json!(["p1", "p2"]))]
    pub product_ids: Option<Vec<ProductId>>,
}
