//! HTTP API server for the Carte gateway

pub mod health;
pub mod menu;
pub mod sessions;
pub mod voice;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::assistant::Assistant;
use crate::catalog::Catalog;
use crate::session::SessionStore;
use crate::voice::SpeechToText;

/// Information about the current LLM model
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub provider: String,
}

/// Shared state for API handlers
pub struct ApiState {
    pub catalog: Arc<Catalog>,
    /// Present only when a chat API key is configured
    pub assistant: Option<Arc<Assistant>>,
    /// Present only when voice is enabled and an STT key is configured
    pub stt: Option<Arc<SpeechToText>>,
    pub sessions: SessionStore,
    pub model_info: Option<ModelInfo>,
    /// Default language hint for transcription
    pub default_language: Option<String>,
}

/// Assemble the full application router
pub fn build_router(state: Arc<ApiState>, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .merge(health::router())
        .merge(health::ready_router(Arc::clone(&state)))
        .nest("/api/menu", menu::router(Arc::clone(&state)))
        .nest("/api/sessions", sessions::router(Arc::clone(&state)))
        .nest("/api/voice", voice::router(state));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
    )
}
