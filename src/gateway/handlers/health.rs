//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::ApiResponse;

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
    /// Build revision
    #[schema(example = "a1b2c3d")]
    pub version: String,
}

/// Health check endpoint
///
/// Probes the order store under the collaborator timeout. Details of a
/// failed probe go to the log only.
///
/// - Healthy: 200 OK + {code: 0, data: {timestamp_ms, version}}
/// - Unhealthy: 503 Service Unavailable + {code: 503, msg: "unavailable"}
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let timeout = state.orchestrator.settings().timeout;
    let probe = state.orchestrator.order_store().ping();

    let healthy = match tokio::time::timeout(timeout, probe).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!("[HEALTH] Order store ping failed: {}", e);
            false
        }
        Err(_) => {
            tracing::error!("[HEALTH] Order store ping timed out");
            false
        }
    };

    if healthy {
        (
            StatusCode::OK,
            Json(ApiResponse::success(HealthResponse {
                timestamp_ms: Utc::now().timestamp_millis(),
                version: env!("GIT_HASH").to_string(),
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::error(503, "unavailable")),
        )
    }
}
