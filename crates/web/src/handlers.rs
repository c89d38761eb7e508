//! Route handlers for the chat page and its JSON API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use docchat_rag::{AssistantPayload, ChatSession, ConversationTurn, Mode};
use serde::{Deserialize, Serialize};

use crate::cookie::SessionId;
use crate::error::ApiError;
use crate::page::PageView;
use crate::state::AppState;
use crate::view::{self, ChatBubble};

// =============================================================================
// HTML page
// =============================================================================

fn render_page(
    state: &AppState,
    session: &ChatSession,
    error: Option<String>,
) -> Result<String, ApiError> {
    let page = PageView::for_session(session, error);
    Ok(state.pages.render(&page)?)
}

/// GET / - the chat page for the caller's session.
///
/// A caller without a stored session sees the greeting; nothing is stored
/// until it sends a message or picks a mode.
pub async fn index(
    State(state): State<AppState>,
    session_id: SessionId,
) -> Result<Response, ApiError> {
    let html = match state.existing_session(session_id.id) {
        Some(shared) => render_page(&state, &*shared.lock().await, None)?,
        None => render_page(&state, &state.transient_session(), None)?,
    };
    Ok(session_id.attach(Html(html)))
}

/// Form body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub message: String,
}

/// POST /chat - answer a message sent from the page.
///
/// Redirects back to the page on success. On failure the page is rendered
/// in place with the error banner and the session is left unchanged.
pub async fn chat(
    State(state): State<AppState>,
    session_id: SessionId,
    Form(form): Form<ChatForm>,
) -> Result<Response, ApiError> {
    let message = form.message.trim();
    if message.is_empty() {
        return Ok(session_id.attach(Redirect::to("/")));
    }

    let shared = state.session(session_id.id);
    let mut session = shared.lock().await;

    match state.orchestrator.respond(&mut session, message).await {
        Ok(payload) => {
            session.record_turn(message, payload);
            Ok(session_id.attach(Redirect::to("/")))
        }
        Err(e) => {
            let err = ApiError::from(e);
            tracing::warn!("Chat turn failed: {}", err.message());

            let banner = view::build_error_message(err.message());
            let html = render_page(&state, &session, Some(banner))?;
            Ok(session_id.attach((err.status(), Html(html))))
        }
    }
}

/// Form body for POST /mode.
#[derive(Debug, Deserialize)]
pub struct ModeForm {
    pub mode: String,
}

/// POST /mode - switch the session's answer mode.
pub async fn set_mode(
    State(state): State<AppState>,
    session_id: SessionId,
    Form(form): Form<ModeForm>,
) -> Result<Response, ApiError> {
    let mode: Mode = form.mode.parse()?;

    let shared = state.session(session_id.id);
    shared.lock().await.mode = mode;
    tracing::debug!("Session {} switched to {} mode", session_id.id, mode);

    Ok(session_id.attach(Redirect::to("/")))
}

// =============================================================================
// JSON API
// =============================================================================

/// Request body for POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Answer in this mode; the session keeps it once the turn succeeds.
    #[serde(default)]
    pub mode: Option<Mode>,
}

/// Response for POST /api/chat.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub payload: AssistantPayload,
    /// The same turn as the page would render it.
    pub bubble: ChatBubble,
}

/// POST /api/chat - answer a message and return the payload.
pub async fn api_chat(
    State(state): State<AppState>,
    session_id: SessionId,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let shared = state.session(session_id.id);
    let mut session = shared.lock().await;

    // The requested mode sticks only if the turn succeeds
    let previous_mode = session.mode;
    if let Some(mode) = request.mode {
        session.mode = mode;
    }

    let payload = match state.orchestrator.respond(&mut session, message).await {
        Ok(payload) => payload,
        Err(e) => {
            session.mode = previous_mode;
            return Err(e.into());
        }
    };
    session.record_turn(message, payload.clone());

    let bubble = view::render_turn(&ConversationTurn::Assistant {
        content: payload.clone(),
    });

    Ok(session_id.attach(Json(ChatReply { payload, bubble })))
}

/// Response for GET /api/history.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub mode: Mode,
    pub messages: Vec<ConversationTurn>,
}

/// GET /api/history - the session's display log.
pub async fn api_history(
    State(state): State<AppState>,
    session_id: SessionId,
) -> Response {
    let history = match state.existing_session(session_id.id) {
        Some(shared) => {
            let session = shared.lock().await;
            HistoryResponse {
                mode: session.mode,
                messages: session.messages.clone(),
            }
        }
        None => {
            let session = state.transient_session();
            HistoryResponse {
                mode: session.mode,
                messages: session.messages,
            }
        }
    };

    session_id.attach(Json(history))
}

// =============================================================================
// Health
// =============================================================================

/// Response for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub sessions: usize,
}

/// GET /health - liveness and basic counters.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
            sessions: state.session_count(),
        }),
    )
}
