//! POST /chat: answers a question, optionally in the context of prior turns.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::info;

use crate::{
    app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::chat::chat_request::{ChatRequest, ChatResponse},
};

/// Handler: POST /chat
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/chat \
///   -H 'content-type: application/json' \
///   -d '{"question":"How many parameters?","history":[{"question":"What is GPT-3?","answer":"An AI model."}]}'
/// ```
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    if body.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }

    info!(turns = body.history.len(), "chat request");
    let answer = state.bot.chat(&body.question, &body.history).await?;
    Ok(Json(ChatResponse { answer }))
}
