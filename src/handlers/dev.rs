use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{CallerId, InboundMessage, Step};
use crate::services::dispatch;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DevMessage {
    pub caller_id: CallerId,
    #[serde(default)]
    pub chat_id: Option<i64>,
    pub message: String,
}

#[derive(Serialize)]
pub struct DevResponse {
    pub reply: String,
    pub step: Step,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DevMessage>,
) -> Result<Json<DevResponse>, AppError> {
    if !state.config.dev_endpoints {
        return Err(AppError::NotFound("dev endpoints are disabled".to_string()));
    }

    let text = payload.message.trim().to_string();
    if text.is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let inbound = InboundMessage {
        caller_id: payload.caller_id,
        chat_id: payload.chat_id.unwrap_or(payload.caller_id),
        text,
    };
    let reply = dispatch::reply_for(&state, &inbound).await;

    let session = state.sessions.get_or_create(inbound.caller_id, inbound.chat_id);
    let step = session.lock().await.step;

    Ok(Json(DevResponse { reply, step }))
}
