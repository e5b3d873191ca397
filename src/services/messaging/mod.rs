pub mod polling;
pub mod telegram;

use std::path::Path;

use async_trait::async_trait;

#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;

    async fn send_voice(&self, chat_id: i64, audio: &Path, caption: &str) -> anyhow::Result<()>;
}
