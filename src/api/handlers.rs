//! HTTP request handlers

use super::types::{
    CallbackRequest, ChatEventResponse, ErrorResponse, HandOffQuery, HandOffResponse,
    MessageRequest, SessionResponse,
};
use super::AppState;
use crate::payload::HandOff;
use crate::session::SessionStore;
use crate::state_machine::{EntryCommand, Event};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat input
        .route("/api/chats/:chat_id/messages", post(post_message))
        .route("/api/chats/:chat_id/callbacks", post(post_callback))
        // Flow inspection
        .route("/api/chats/:chat_id/session", get(get_session))
        // Signing surface
        .route("/api/handoff", get(get_handoff))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Chat Input
// ============================================================

async fn post_message(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ChatEventResponse>, AppError> {
    let event = match EntryCommand::from_command(req.text.trim()) {
        Some(command) => Event::Command(command),
        None => Event::Text(req.text),
    };
    dispatch(&state, &chat_id, event).await
}

async fn post_callback(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(req): Json<CallbackRequest>,
) -> Result<Json<ChatEventResponse>, AppError> {
    let command = EntryCommand::from_button(&req.data)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown button: {}", req.data)))?;
    dispatch(&state, &chat_id, Event::Command(command)).await
}

async fn dispatch(
    state: &AppState,
    chat_id: &str,
    event: Event,
) -> Result<Json<ChatEventResponse>, AppError> {
    if chat_id.trim().is_empty() {
        return Err(AppError::BadRequest("Chat id is empty".to_string()));
    }
    let messages = state
        .manager
        .dispatch(chat_id, event)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(ChatEventResponse { messages }))
}

// ============================================================
// Flow Inspection
// ============================================================

async fn get_session(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .manager
        .sessions()
        .get(&chat_id)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(match session {
        Some(session) => SessionResponse {
            chat_id,
            state: session.state.name(),
            updated_at: Some(session.updated_at),
        },
        None => SessionResponse {
            chat_id,
            state: "idle",
            updated_at: None,
        },
    }))
}

// ============================================================
// Signing Hand-off
// ============================================================

/// Rebuild the descriptor a hand-off link describes. Any missing or invalid
/// parameter is a hard failure; nothing is defaulted.
async fn get_handoff(Query(query): Query<HandOffQuery>) -> Result<Json<HandOffResponse>, AppError> {
    let handoff = HandOff::from_params(
        query.action.as_deref(),
        query.amount.as_deref(),
        query.vault.as_deref(),
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    tracing::info!(
        action = handoff.action.as_str(),
        amount = %handoff.amount,
        vault = %handoff.vault,
        "Hand-off link resolved"
    );

    Ok(Json(HandOffResponse {
        action: handoff.action.as_str(),
        amount: handoff.amount.to_string(),
        vault: handoff.vault.to_string(),
        payload: handoff.descriptor(),
    }))
}

async fn get_version() -> &'static str {
    concat!("moveyield-copilot ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
