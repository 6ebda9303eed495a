//! Health check endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Serialize;

use super::ApiState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed readiness response
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

/// Individual readiness checks
#[derive(Serialize)]
pub struct ReadinessChecks {
    pub catalog: CheckResult,
    pub chat: CheckResult,
    pub stt: CheckResult,
}

/// Result of a single health check
#[derive(Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    const fn ok() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            status: "fail",
            message: Some(message.into()),
        }
    }

    fn unavailable() -> Self {
        Self {
            status: "unavailable",
            message: Some("not configured".to_string()),
        }
    }
}

/// Liveness probe - is the service running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness probe - is the service ready to accept traffic?
async fn ready(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<ReadinessResponse>) {
    let catalog_check = if state.catalog.item_count() > 0 {
        CheckResult::ok()
    } else {
        CheckResult::fail("catalog is empty")
    };
    let chat_check = if state.assistant.is_some() {
        CheckResult::ok()
    } else {
        CheckResult::unavailable()
    };
    let stt_check = if state.stt.is_some() {
        CheckResult::ok()
    } else {
        CheckResult::unavailable()
    };

    // Missing collaborators degrade features; only a broken catalog makes
    // the gateway unusable.
    let all_ok = catalog_check.status == "ok";
    let status = if all_ok { "ok" } else { "degraded" };
    let http_status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        http_status,
        Json(ReadinessResponse {
            status,
            checks: ReadinessChecks {
                catalog: catalog_check,
                chat: chat_check,
                stt: stt_check,
            },
        }),
    )
}

/// System status response including model info
#[derive(Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub restaurant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<super::ModelInfo>,
    pub voice_available: bool,
    pub sessions: usize,
}

/// Get system status
async fn status(State(state): State<Arc<ApiState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        restaurant: state.catalog.restaurant.name.clone(),
        model: state.model_info.clone(),
        voice_available: state.stt.is_some(),
        sessions: state.sessions.len().await,
    })
}

/// Build health router (liveness only, no state needed)
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

/// Build readiness router (needs state for checks)
pub fn ready_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .route("/api/status", get(status))
        .with_state(state)
}
