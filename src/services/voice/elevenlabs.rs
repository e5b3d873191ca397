use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use super::{TtsError, TtsProvider};

const API_BASE: &str = "https://api.elevenlabs.io/v1";
const MODEL_ID: &str = "eleven_multilingual_v2";

pub struct ElevenLabsProvider {
    api_key: String,
    voice_id: String,
    client: reqwest::Client,
}

impl ElevenLabsProvider {
    pub fn new(api_key: String, voice_id: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            voice_id,
            client,
        })
    }

    fn classify(&self, status: StatusCode, body: &str) -> TtsError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TtsError::InvalidCredentials,
            StatusCode::NOT_FOUND => TtsError::VoiceNotFound(self.voice_id.clone()),
            _ => TtsError::Other(format!("ElevenLabs API error ({status}): {body}")),
        }
    }
}

#[async_trait]
impl TtsProvider for ElevenLabsProvider {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let body = json!({
            "text": text,
            "model_id": MODEL_ID,
            "voice_settings": {
                "stability": 0.71,
                "similarity_boost": 0.5,
                "style": 0.0,
                "use_speaker_boost": true,
            },
        });

        let resp = self
            .client
            .post(format!("{API_BASE}/text-to-speech/{}", self.voice_id))
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| TtsError::Other(format!("failed to call ElevenLabs API: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let err = resp.text().await.unwrap_or_default();
            return Err(self.classify(status, &err));
        }

        let audio = resp
            .bytes()
            .await
            .map_err(|e| TtsError::Other(format!("failed to read ElevenLabs audio: {e}")))?;
        if audio.is_empty() {
            return Err(TtsError::Other("ElevenLabs returned empty audio".to_string()));
        }

        let preview: String = text.chars().take(50).collect();
        tracing::info!(bytes = audio.len(), text = %preview, "generated speech");
        Ok(audio.to_vec())
    }

    async fn check_connection(&self) -> Result<(), TtsError> {
        let resp = self
            .client
            .get(format!("{API_BASE}/voices/{}", self.voice_id))
            .header("xi-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| TtsError::Other(format!("failed to call ElevenLabs API: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let err = resp.text().await.unwrap_or_default();
        Err(self.classify(status, &err))
    }
}
