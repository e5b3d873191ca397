pub mod extraction;
pub mod intent;
pub mod openai;
pub mod prompts;
pub mod reply;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatProfile {
    Reply,
    Extraction,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(
        &self,
        profile: ChatProfile,
        system_prompt: &str,
        messages: &[Message],
    ) -> anyhow::Result<String>;
}
