use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{ChatProfile, LlmProvider, Message};

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiProvider {
    api_key: String,
    reply_model: String,
    extraction_model: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        reply_model: String,
        extraction_model: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build OpenAI HTTP client")?;
        Ok(Self {
            api_key,
            reply_model,
            extraction_model,
            client,
        })
    }

    fn settings(&self, profile: ChatProfile) -> (&str, u32, f32) {
        match profile {
            ChatProfile::Reply => (&self.reply_model, 200, 0.7),
            ChatProfile::Extraction => (&self.extraction_model, 150, 0.1),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(
        &self,
        profile: ChatProfile,
        system_prompt: &str,
        messages: &[Message],
    ) -> anyhow::Result<String> {
        let (model, max_tokens, temperature) = self.settings(profile);

        let mut chat_messages = Vec::with_capacity(messages.len() + 1);
        if !system_prompt.is_empty() {
            chat_messages.push(json!({
                "role": "system",
                "content": system_prompt,
            }));
        }
        for msg in messages {
            chat_messages.push(json!({
                "role": msg.role,
                "content": msg.content,
            }));
        }

        let body = json!({
            "model": model,
            "messages": chat_messages,
            "max_tokens": max_tokens,
            "temperature": temperature,
        });

        let resp = self
            .client
            .post(COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call OpenAI API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse OpenAI response")?;

        if !status.is_success() {
            anyhow::bail!("OpenAI API error ({}): {}", status, data);
        }

        data["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing content in OpenAI response"))
    }
}
