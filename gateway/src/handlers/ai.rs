//! Text generation and chat pass-throughs.
//!
//! Both endpoints forward to a hosted chat completions API and return the
//! first choice. Nothing is stored between requests.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

/// `POST /api/generate`
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<GenerateResponse>> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt must not be empty".to_string()));
    }

    let messages = vec![ChatMessage {
        role: "user".to_string(),
        content: request.prompt,
    }];
    let message = complete(&state, &messages).await?;

    Ok(Json(GenerateResponse {
        text: message.content,
    }))
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    if request.messages.is_empty() {
        return Err(AppError::BadRequest(
            "messages must not be empty".to_string(),
        ));
    }
    if let Some(bad) = request
        .messages
        .iter()
        .find(|m| !matches!(m.role.as_str(), "system" | "user" | "assistant"))
    {
        return Err(AppError::BadRequest(format!("unsupported role: {}", bad.role)));
    }

    let message = complete(&state, &request.messages).await?;
    Ok(Json(ChatResponse { message }))
}

async fn complete(state: &AppState, messages: &[ChatMessage]) -> AppResult<ChatMessage> {
    let api_key = state.config.api_key().ok_or(AppError::MissingApiKey)?;
    let url = format!(
        "{}/{}",
        state.config.openai_base_url.trim_end_matches('/'),
        CHAT_COMPLETIONS_PATH
    );

    debug!(model = %state.config.chat_model, messages = messages.len(), "Requesting completion");

    let response = state
        .http_client
        .post(&url)
        .bearer_auth(api_key)
        .json(&json!({
            "model": state.config.chat_model,
            "messages": messages,
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Chat completion request failed");
        return Err(AppError::Upstream(format!(
            "chat completion returned {}: {body}",
            status.as_u16()
        )));
    }

    let completion: CompletionResponse = response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("invalid chat completion response: {e}")))?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Upstream("chat completion returned no choices".to_string()))?;

    Ok(ChatMessage {
        role: choice.message.role,
        content: choice.message.content.unwrap_or_default(),
    })
}
