//! AI supplement advisor.

use axum::{Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::services::chat::ChatMessage;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// Answer the last user message.
///
/// POST /api/chat
#[instrument(skip(state, body), fields(messages = body.messages.len()))]
async fn chat(State(state): State<AppState>, Json(body): Json<ChatRequest>) -> Result<Json<ChatReply>> {
    let client = state.chat().ok_or_else(|| {
        AppError::ServiceUnavailable("Danışman şu anda kullanılamıyor".to_string())
    })?;
    let reply = client.reply(&body.messages).await?;
    Ok(Json(ChatReply { reply }))
}
