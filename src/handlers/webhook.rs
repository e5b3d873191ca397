use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::errors::AppError;
use crate::services::dispatch;
use crate::services::messaging::telegram::Update;
use crate::state::AppState;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

pub async fn telegram_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> Result<StatusCode, AppError> {
    if let Some(expected) = state.config.telegram_webhook_secret.as_deref() {
        let provided = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if provided != expected {
            tracing::warn!("rejected Telegram webhook with bad secret token");
            return Err(AppError::Unauthorized);
        }
    }

    let update_id = update.update_id;
    match update.into_inbound() {
        Some(inbound) => {
            dispatch::enqueue(&state, inbound);
        }
        None => tracing::debug!(update_id, "ignoring non-text update"),
    }

    Ok(StatusCode::OK)
}
