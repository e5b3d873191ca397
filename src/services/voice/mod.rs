pub mod elevenlabs;
pub mod sender;

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TtsError {
    #[error("TTS credentials rejected")]
    InvalidCredentials,

    #[error("voice not found: {0}")]
    VoiceNotFound(String),

    #[error("TTS failed: {0}")]
    Other(String),
}

#[async_trait]
pub trait TtsProvider: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError>;

    async fn check_connection(&self) -> Result<(), TtsError>;
}
