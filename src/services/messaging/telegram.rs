use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::MessagingProvider;
use crate::models::InboundMessage;

const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

// ── Bot API wire types ──

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl Update {
    // The caller is the sender, or the chat for channel posts.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let message = self.message?;
        let text = message.text?;
        let caller_id = message.from.map(|u| u.id).unwrap_or(message.chat.id);
        Some(InboundMessage {
            caller_id,
            chat_id: message.chat.id,
            text,
        })
    }
}

#[derive(Clone)]
pub struct TelegramProvider {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramProvider {
    pub fn new(bot_token: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Telegram HTTP client")?;
        Ok(Self { bot_token, client })
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> anyhow::Result<T> {
        let resp: ApiResponse<T> = request
            .send()
            .await
            .with_context(|| format!("failed to call Telegram {method}"))?
            .json()
            .await
            .with_context(|| format!("failed to parse Telegram {method} response"))?;

        if !resp.ok {
            anyhow::bail!(
                "Telegram {method} failed: {}",
                resp.description.unwrap_or_default()
            );
        }
        resp.result
            .ok_or_else(|| anyhow::anyhow!("missing result in Telegram {method} response"))
    }

    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> anyhow::Result<Vec<Update>> {
        let body = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        // The HTTP timeout must outlast the long-poll window.
        let request = self
            .client
            .post(self.api_url("getUpdates"))
            .timeout(Duration::from_secs(timeout_secs + 10))
            .json(&body);
        self.call("getUpdates", request).await
    }

    pub async fn set_webhook(&self, url: &str, secret: Option<&str>) -> anyhow::Result<()> {
        let mut body = json!({
            "url": url,
            "allowed_updates": ["message"],
        });
        if let Some(secret) = secret {
            body["secret_token"] = json!(secret);
        }
        let request = self.client.post(self.api_url("setWebhook")).json(&body);
        let _: bool = self.call("setWebhook", request).await?;
        tracing::info!(url, "Telegram webhook registered");
        Ok(())
    }

    pub async fn delete_webhook(&self) -> anyhow::Result<()> {
        let request = self.client.post(self.api_url("deleteWebhook"));
        let _: bool = self.call("deleteWebhook", request).await?;
        Ok(())
    }
}

#[async_trait]
impl MessagingProvider for TelegramProvider {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        for chunk in split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH) {
            let request = self.client.post(self.api_url("sendMessage")).json(&json!({
                "chat_id": chat_id,
                "text": chunk,
            }));
            let _: serde_json::Value = self.call("sendMessage", request).await?;
        }
        Ok(())
    }

    async fn send_voice(&self, chat_id: i64, audio: &Path, caption: &str) -> anyhow::Result<()> {
        let file_name = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("voice.mp3")
            .to_string();

        let bytes = tokio::fs::read(audio)
            .await
            .with_context(|| format!("failed to read audio file {}", audio.display()))?;
        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str("audio/mpeg")?;

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("voice", part);

        let request = self.client.post(self.api_url("sendVoice")).multipart(form);
        let _: serde_json::Value = self.call("sendVoice", request).await?;

        tracing::info!(chat_id, file = %file_name, "Telegram voice sent");
        Ok(())
    }
}

pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|c| c.iter().collect())
        .collect()
}
