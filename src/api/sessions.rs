//! Conversation session endpoints
//!
//! Each session holds its own dialogue and menu state; the per-session lock
//! serializes turns so reconciliations never run concurrently against the
//! same state.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiState;
use crate::assistant::TurnOutcome;
use crate::catalog::MenuItem;
use crate::filters::visible_items;
use crate::session::{Session, SessionState};

/// Build sessions router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", post(create_session))
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/turns", post(run_turn))
        .with_state(state)
}

/// Session snapshot returned by create/read
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    session_id: Uuid,
    state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_reply: Option<String>,
    visible: Vec<MenuItem>,
}

fn snapshot(state: &ApiState, session: &Session) -> SessionResponse {
    let session_state = session.state().clone();
    let visible = visible_items(&state.catalog, &session_state.category, &session_state.filters)
        .into_iter()
        .cloned()
        .collect();
    SessionResponse {
        session_id: session.id(),
        state: session_state,
        last_reply: session.last_reply().map(String::from),
        visible,
    }
}

/// Create a conversation session
async fn create_session(State(state): State<Arc<ApiState>>) -> (StatusCode, Json<SessionResponse>) {
    let (_, handle) = state.sessions.create().await;
    let session = handle.lock().await;
    (StatusCode::CREATED, Json(snapshot(&state, &session)))
}

/// Read a session's current state patch
async fn get_session(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, SessionError> {
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or(SessionError::NotFound(session_id))?;
    let session = handle.lock().await;
    Ok(Json(snapshot(&state, &session)))
}

/// One conversational turn
#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub text: String,
}

/// Turn result for the presentation layer
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TurnResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<String>,
    no_speech: bool,
    action_applied: bool,
    state: SessionState,
    visible: Vec<MenuItem>,
    /// Upstream failure surfaced distinctly from a normal reply
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run a turn against a session
async fn run_turn(
    State(state): State<Arc<ApiState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, SessionError> {
    let assistant = state
        .assistant
        .as_ref()
        .ok_or(SessionError::ChatUnavailable)?
        .clone();
    let handle = state
        .sessions
        .get(session_id)
        .await
        .ok_or(SessionError::NotFound(session_id))?;

    let mut session = handle.lock().await;
    let outcome = assistant.run_turn(&mut session, &request.text).await;

    let response = match outcome {
        TurnOutcome::Reply {
            text,
            action_applied,
            state: session_state,
            visible,
        } => TurnResponse {
            reply: Some(text),
            no_speech: false,
            action_applied,
            state: session_state,
            visible,
            error: None,
        },
        TurnOutcome::NoSpeech => {
            let snap = snapshot(&state, &session);
            TurnResponse {
                reply: None,
                no_speech: true,
                action_applied: false,
                state: snap.state,
                visible: snap.visible,
                error: None,
            }
        }
        TurnOutcome::UpstreamError { message } => {
            let snap = snapshot(&state, &session);
            TurnResponse {
                reply: None,
                no_speech: false,
                action_applied: false,
                state: snap.state,
                visible: snap.visible,
                error: Some(message),
            }
        }
    };

    Ok(Json(response))
}

/// Session API errors
#[derive(Debug)]
pub enum SessionError {
    NotFound(Uuid),
    ChatUnavailable,
}

impl IntoResponse for SessionError {
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
            Self::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "session_not_found",
                format!("no session {id}"),
            ),
            Self::ChatUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "chat_unavailable",
                "no chat API key configured".to_string(),
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
