//! Voice API endpoints for speech-to-text

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::ApiState;
use crate::voice::MAX_AUDIO_BYTES;

/// Build voice router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/transcribe", post(transcribe))
        // Raw audio uploads exceed axum's default body limit
        .layer(DefaultBodyLimit::max(MAX_AUDIO_BYTES))
        .route("/capabilities", get(capabilities))
        .with_state(state)
}

/// Voice capabilities response
#[derive(Debug, Serialize)]
pub struct VoiceCapabilities {
    pub stt_available: bool,
}

/// Get voice capabilities
async fn capabilities(State(state): State<Arc<ApiState>>) -> Json<VoiceCapabilities> {
    Json(VoiceCapabilities {
        stt_available: state.stt.is_some(),
    })
}

/// Transcription query parameters
#[derive(Debug, Deserialize)]
struct TranscribeQuery {
    /// Language hint (e.g. "fr"); defaults to the configured language
    language: Option<String>,
}

/// Transcription response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeResponse {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// True when the audio contained no detectable speech — a normal
    /// outcome, not an error
    pub no_speech: bool,
}

/// Transcribe audio to text
///
/// Accepts raw audio bytes in WAV format
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<TranscribeQuery>,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, VoiceError> {
    let stt = state
        .stt
        .as_ref()
        .ok_or(VoiceError::NotConfigured("STT not configured"))?;

    if body.is_empty() {
        return Err(VoiceError::BadRequest("Empty audio data"));
    }
    if body.len() > MAX_AUDIO_BYTES {
        return Err(VoiceError::PayloadTooLarge);
    }

    let language = query.language.or_else(|| state.default_language.clone());
    let transcription = stt
        .transcribe(&body, language.as_deref())
        .await
        .map_err(|e| VoiceError::TranscriptionFailed(e.to_string()))?;

    let no_speech = !transcription.is_speech();
    Ok(Json(TranscribeResponse {
        text: transcription.text,
        language: transcription.language,
        no_speech,
    }))
}

/// Voice API errors
#[derive(Debug)]
pub enum VoiceError {
    NotConfigured(&'static str),
    BadRequest(&'static str),
    PayloadTooLarge,
    TranscriptionFailed(String),
}

impl IntoResponse for VoiceError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::NotConfigured(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_configured",
                msg.to_string(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                format!("audio payload exceeds the {MAX_AUDIO_BYTES} byte cap"),
            ),
            Self::TranscriptionFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "transcription_failed",
                msg,
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
