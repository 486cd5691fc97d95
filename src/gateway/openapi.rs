//! OpenAPI Documentation
//!
//! Generated OpenAPI 3 document for the checkout service.
//!
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{CheckoutRequest, CheckoutResponse, ErrorBody};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront Checkout API",
        version = "1.0.0",
        description = "Turns a storefront cart into a pending order and a hosted Moyasar payment page."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::checkout::create_checkout,
        crate::gateway::handlers::health::health_check,
    ),
    components(
        schemas(
            CheckoutRequest,
            CheckoutResponse,
            ErrorBody,
            HealthResponse,
        )
    ),
    tags(
        (name = "Checkout", description = "Cart checkout and payment session"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Storefront Checkout API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("productIds"));
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths;
        assert!(paths.paths.contains_key("/{store_id}/checkout"));
        assert!(paths.paths.contains_key("/api/v1/health"));
    }
}
