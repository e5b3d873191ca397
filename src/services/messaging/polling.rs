use std::sync::Arc;
use std::time::Duration;

use super::telegram::TelegramProvider;
use crate::services::dispatch;
use crate::state::AppState;

pub const POLL_TIMEOUT_SECS: u64 = 30;
pub const ERROR_BACKOFF: Duration = Duration::from_secs(5);

pub fn start(telegram: Arc<TelegramProvider>, state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = telegram.delete_webhook().await {
            tracing::warn!(error = %e, "failed to clear Telegram webhook before polling");
        }
        tracing::info!("Telegram polling started");

        let mut offset: i64 = 0;
        loop {
            let updates = match telegram.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!(error = %e, "Telegram poll failed");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                let Some(inbound) = update.into_inbound() else {
                    tracing::debug!("ignoring non-text update");
                    continue;
                };
                dispatch::enqueue(&state, inbound);
            }
        }
    })
}
