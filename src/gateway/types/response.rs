//! API response types
//!
//! Checkout responses keep the storefront's wire shape:
//! - 200 `{"url": ...}`
//! - 400 plain text
//! - 500 `{"error": ...}`

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::checkout::{CheckoutError, INVALID_REQUEST_MESSAGE};

/// Unified wrapper for system endpoints
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or absent (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    #[schema(example = 0)]
    pub code: i32,
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Successful checkout
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// Hosted payment page
    #[schema(example = "https://pay.example/s/abc")]
    pub url: String,
}

/// Body of every 500 response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "An unexpected error occurred")]
    pub error: String,
}

/// Checkout failure as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub CheckoutError);

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            CheckoutError::InvalidRequest => {
                (StatusCode::BAD_REQUEST, INVALID_REQUEST_MESSAGE).into_response()
            }
            ref other => {
                let status = StatusCode::from_u16(other.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let body = ErrorBody {
                    error: other.client_message(),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::GENERIC_ERROR_MESSAGE;
    use axum::body::to_bytes;
    use axum::http::header::CONTENT_TYPE;

    async fn render(err: CheckoutError) -> (StatusCode, String, String) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_request_is_plain_text_400() {
        let (status, content_type, body) = render(CheckoutError::InvalidRequest).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(content_type.starts_with("text/plain"));
        assert_eq!(body, "Product ids are required");
    }

    #[tokio::test]
    async fn test_internal_failure_is_json_500() {
        let (status, content_type, body) =
            render(CheckoutError::Persistence("pool closed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type, "application/json");

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], GENERIC_ERROR_MESSAGE);
        assert!(!body.contains("pool closed"));
    }

    #[tokio::test]
    async fn test_gateway_message_forwarded() {
        let (status, _, body) = render(CheckoutError::Gateway {
            message: Some("Invalid amount".into()),
            detail: "HTTP 400".into(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"Invalid amount"}"#);
    }

    #[test]
    fn test_api_response_success_shape() {
        let json = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"], 1);

        let json = serde_json::to_value(ApiResponse::<()>::error(503, "unavailable")).unwrap();
        assert!(json.get("data").is_none());
    }
}
