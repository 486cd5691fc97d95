//! HTTP gateway
//!
//! ```text
//! OPTIONS /{store_id}/checkout     -> 200, empty body
//! POST    /{store_id}/checkout     -> 200 {"url"} | 400 text | 500 {"error"}
//! GET     /api/v1/health           -> order store probe
//! GET     /api-docs/openapi.json   -> generated API document
//! ```
//!
//! Every response, errors and 404s included, carries the CORS headers.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{
        HeaderValue, Request,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::info;
use utoipa::OpenApi;

use crate::config::ServerConfig;
pub use state::AppState;

pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Axum middleware adding CORS headers to every response
async fn cors_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, state.cors_allow_origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    response
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi::ApiDoc::openapi())
}

/// Build the complete router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/{store_id}/checkout",
            post(handlers::create_checkout).options(handlers::checkout_preflight),
        )
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(from_fn_with_state(state.clone(), cors_middleware))
        .with_state(state)
}

/// Start HTTP server; returns after Ctrl-C
pub async fn run_server(config: &ServerConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;

    info!(bind = %local, "Checkout gateway listening");
    info!("Checkout:  POST http://{}/{{store_id}}/checkout", local);
    info!("API Docs:  http://{}/api-docs/openapi.json", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{CheckoutOrchestrator, CheckoutSettings, CheckoutUrls};
    use crate::payment::PaymentError;
    use crate::payment::mock::MockGateway;
    use crate::models::Product;
    use crate::store::InMemoryStore;
    use axum::body::to_bytes;
    use axum::http::{Method, StatusCode, header::CONTENT_TYPE};
    use rust_decimal::Decimal;
    use std::time::Duration;
    use tower::ServiceExt;

    const REDIRECT: &str = "https://pay.example/s/abc";

    struct TestApp {
        router: Router,
        store: Arc<InMemoryStore>,
        gateway: Arc<MockGateway>,
    }

    fn test_app(gateway: MockGateway) -> TestApp {
        let store = Arc::new(
            InMemoryStore::new()
                .with_store("store-1")
                .with_product(Product::new("p1", Decimal::new(1999, 2)))
                .with_product(Product::new("p2", Decimal::new(500, 2))),
        );
        let gateway = Arc::new(gateway);
        let settings = CheckoutSettings {
            urls: CheckoutUrls::new("https://shop.example").unwrap(),
            currency: "SAR".to_string(),
            description: "Order payment".to_string(),
            save_card: true,
            include_return_urls: false,
            timeout: Duration::from_secs(5),
        };
        let orchestrator = Arc::new(CheckoutOrchestrator::new(
            store.clone(),
            store.clone(),
            gateway.clone(),
            settings,
        ));
        let state = Arc::new(AppState::new(orchestrator, "*").unwrap());

        TestApp {
            router: build_router(state),
            store,
            gateway,
        }
    }

    fn post_checkout(store: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(format!("/{}/checkout", store))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Response<String>) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        (status, Response::from_parts(parts, body))
    }

    fn assert_cors(response: &Response<String>) {
        let h = response.headers();
        assert_eq!(h[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(h[ACCESS_CONTROL_ALLOW_METHODS], CORS_ALLOW_METHODS);
        assert_eq!(h[ACCESS_CONTROL_ALLOW_HEADERS], CORS_ALLOW_HEADERS);
    }

    #[tokio::test]
    async fn test_checkout_success() {
        let app = test_app(MockGateway::succeeding(REDIRECT));

        let (status, response) = send(
            app.router,
            post_checkout("store-1", r#"{"productIds":["p1","p2"]}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(response.body(), r#"{"url":"https://pay.example/s/abc"}"#);
        assert_cors(&response);
        assert_eq!(app.gateway.calls()[0].amount.get(), 2499);
        assert_eq!(app.store.order_count(), 1);
    }

    #[tokio::test]
    async fn test_preflight() {
        let app = test_app(MockGateway::succeeding(REDIRECT));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/store-1/checkout")
            .body(Body::empty())
            .unwrap();

        let (status, response) = send(app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(response.body().is_empty());
        assert_cors(&response);
        assert_eq!(app.gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bad_bodies_are_400_plain_text() {
        for body in [
            r#"{"productIds":[]}"#,
            r#"{"productIds":null}"#,
            r#"{}"#,
            "not json",
            "",
        ] {
            let app = test_app(MockGateway::succeeding(REDIRECT));
            let (status, response) = send(app.router, post_checkout("store-1", body)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
            assert_eq!(response.body(), "Product ids are required");
            assert_cors(&response);
            assert_eq!(app.store.order_count(), 0);
            assert_eq!(app.gateway.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_checkout_accepts_body_without_json_content_type() {
        for content_type in [None, Some("text/plain;charset=UTF-8")] {
            let app = test_app(MockGateway::succeeding(REDIRECT));
            let mut builder = Request::builder()
                .method(Method::POST)
                .uri("/store-1/checkout");
            if let Some(ct) = content_type {
                builder = builder.header(CONTENT_TYPE, ct);
            }
            let request = builder
                .body(Body::from(r#"{"productIds":["p1"]}"#))
                .unwrap();

            let (status, response) = send(app.router, request).await;

            assert_eq!(status, StatusCode::OK, "content type {:?}", content_type);
            assert_eq!(response.body(), r#"{"url":"https://pay.example/s/abc"}"#);
            assert_cors(&response);
            assert_eq!(app.store.order_count(), 1);
            assert_eq!(app.gateway.calls()[0].amount.get(), 1999);
        }
    }

    #[tokio::test]
    async fn test_gateway_failure_is_500_json() {
        let app = test_app(MockGateway::failing(PaymentError::Rejected {
            status: 401,
            message: Some("Invalid authorization credentials".to_string()),
        }));

        let (status, response) =
            send(app.router, post_checkout("store-1", r#"{"productIds":["p1"]}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.body(),
            r#"{"error":"Invalid authorization credentials"}"#
        );
        assert_cors(&response);

        // Order is left behind unpaid
        let orders = app.store.orders();
        assert_eq!(orders.len(), 1);
        assert!(!orders[0].is_paid);
    }

    #[tokio::test]
    async fn test_unknown_store_is_500() {
        let app = test_app(MockGateway::succeeding(REDIRECT));
        let (status, response) =
            send(app.router, post_checkout("ghost", r#"{"productIds":["p1"]}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(json["error"], "An unexpected error occurred");
    }

    #[tokio::test]
    async fn test_health_ok() {
        let app = test_app(MockGateway::succeeding(REDIRECT));
        let request = Request::builder()
            .uri("/api/v1/health")
            .body(Body::empty())
            .unwrap();

        let (status, response) = send(app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(json["code"], 0);
        assert!(json["data"]["timestamp_ms"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_openapi_served() {
        let app = test_app(MockGateway::succeeding(REDIRECT));
        let request = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();

        let (status, response) = send(app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(response.body().contains("/{store_id}/checkout"));
    }

    #[tokio::test]
    async fn test_unknown_route_still_has_cors() {
        let app = test_app(MockGateway::succeeding(REDIRECT));
        let request = Request::builder()
            .uri("/nope")
            .body(Body::empty())
            .unwrap();

        let (status, response) = send(app.router, request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_cors(&response);
    }

    #[test]
    fn test_invalid_cors_origin_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let orchestrator = Arc::new(CheckoutOrchestrator::new(
            store.clone(),
            store,
            Arc::new(MockGateway::succeeding(REDIRECT)),
            CheckoutSettings {
                urls: CheckoutUrls::new("https://shop.example").unwrap(),
                currency: "SAR".to_string(),
                description: String::new(),
                save_card: false,
                include_return_urls: false,
                timeout: Duration::from_secs(1),
            },
        ));
        assert!(AppState::new(orchestrator, "bad\norigin").is_err());
    }
}
