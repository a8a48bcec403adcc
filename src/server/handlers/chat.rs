use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::chat::{AnswerEnvelope, ConversationTurn, DraftReply};
use crate::core::errors::ApiError;
use crate::server::extract::{present, ApiJson};
use crate::state::AppState;

const COMPLETION_FAILED: &str = "回覆產生失敗";
const DRAFT_FAILED: &str = "草稿產生失敗";

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub context_text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ConversationTurn>>,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    #[serde(default, rename = "finalQuestion")]
    pub final_question: Option<String>,
    #[serde(default, rename = "accessToken")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ConversationTurn>>,
}

fn require_token(token: &Option<String>) -> Result<&str, ApiError> {
    present(token).ok_or_else(|| ApiError::missing_fields(vec!["accessToken"]))
}

/// Answers with the caller's context when given, retrieving otherwise.
pub async fn answer(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<AnswerRequest>,
) -> Result<Json<AnswerEnvelope>, ApiError> {
    let token = require_token(&payload.access_token)?;
    let message = payload.message.as_deref().unwrap_or_default();

    let envelope = state
        .assembler
        .answer(token, message, payload.context_text.clone(), &[])
        .await
        .map_err(|err| ApiError::upstream(COMPLETION_FAILED, err))?;
    Ok(Json(envelope))
}

/// Always retrieves fresh context and replays the conversation history.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ChatRequest>,
) -> Result<Json<AnswerEnvelope>, ApiError> {
    let token = require_token(&payload.access_token)?;
    let message = payload.message.as_deref().unwrap_or_default();
    let history = payload.history.as_deref().unwrap_or_default();

    let envelope = state
        .assembler
        .answer(token, message, None, history)
        .await
        .map_err(|err| ApiError::upstream(COMPLETION_FAILED, err))?;
    Ok(Json(envelope))
}

pub async fn draft(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<DraftRequest>,
) -> Result<Json<DraftReply>, ApiError> {
    let token = require_token(&payload.access_token)?;
    let final_question = payload.final_question.as_deref().unwrap_or_default();
    let history = payload.history.as_deref().unwrap_or_default();

    let reply = state
        .assembler
        .draft_post(token, history, final_question)
        .await
        .map_err(|err| ApiError::upstream(DRAFT_FAILED, err))?;
    Ok(Json(reply))
}
