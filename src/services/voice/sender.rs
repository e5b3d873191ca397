use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use sha1::{Digest, Sha1};

use crate::models::CallerId;
use crate::services::messaging::MessagingProvider;
use crate::services::voice::{TtsError, TtsProvider};
use crate::state::AppState;

pub const VOICE_CAPTION: &str = "🎵 Risposta vocale";

const FILE_PREFIX: &str = "response_";
const FILE_EXTENSION: &str = ".mp3";

static NEXT_ARTIFACT: AtomicU64 = AtomicU64::new(0);

pub fn fallback_text(text: &str, error: &TtsError) -> String {
    match error {
        TtsError::InvalidCredentials => format!(
            "🔊 {text}\n\n⚠️ Servizio vocale temporaneamente non disponibile (problema configurazione)"
        ),
        _ => format!("🔊 {text}\n\n⚠️ Servizio vocale temporaneamente non disponibile"),
    }
}

pub fn delivery_error_text(text: &str) -> String {
    format!("🔊 {text}\n\n⚠️ Errore nel servizio vocale")
}

pub struct AudioArtifact {
    path: PathBuf,
}

impl AudioArtifact {
    pub fn file_name(caller_id: CallerId, text: &str) -> String {
        let digest = Sha1::digest(text.as_bytes());
        let hash: String = digest.iter().take(8).map(|b| format!("{b:02x}")).collect();
        let seq = NEXT_ARTIFACT.fetch_add(1, Ordering::Relaxed);
        format!("{FILE_PREFIX}{caller_id}_{hash}_{seq}{FILE_EXTENSION}")
    }

    pub async fn write(
        dir: &Path,
        caller_id: CallerId,
        text: &str,
        audio: &[u8],
    ) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create audio dir {}", dir.display()))?;
        let path = dir.join(Self::file_name(caller_id, text));
        tokio::fs::write(&path, audio)
            .await
            .with_context(|| format!("failed to write audio file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "audio saved");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "cleaned up audio file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(error = %e, path = %self.path.display(), "failed to clean up audio file")
            }
        }
    }
}

pub async fn cleanup_audio_dir(dir: &Path) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(FILE_PREFIX)
            && name.ends_with(FILE_EXTENSION)
            && entry.file_type().await?.is_file()
        {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }

    if let Err(e) = tokio::fs::remove_dir(dir).await {
        tracing::debug!(error = %e, dir = %dir.display(), "audio directory kept");
    }
    Ok(removed)
}

pub async fn send_voice_response(state: &AppState, caller_id: CallerId, chat_id: i64, text: &str) {
    speak(
        state.tts.as_ref(),
        state.messaging.as_ref(),
        &state.config.audio_dir,
        caller_id,
        chat_id,
        text,
    )
    .await;
}

pub async fn speak(
    tts: &dyn TtsProvider,
    messaging: &dyn MessagingProvider,
    audio_dir: &Path,
    caller_id: CallerId,
    chat_id: i64,
    text: &str,
) {
    let delivered = match tts.synthesize(text).await {
        Ok(audio) => deliver_audio(messaging, audio_dir, caller_id, chat_id, text, &audio).await,
        Err(e) => {
            tracing::warn!(error = %e, caller_id, "voice generation failed, sending text fallback");
            messaging
                .send_message(chat_id, &fallback_text(text, &e))
                .await
        }
    };

    if let Err(e) = delivered {
        tracing::error!(error = %e, caller_id, "failed to send response");
        if let Err(e) = messaging
            .send_message(chat_id, &delivery_error_text(text))
            .await
        {
            tracing::error!(error = %e, caller_id, "text fallback failed as well");
        }
    }
}

async fn deliver_audio(
    messaging: &dyn MessagingProvider,
    audio_dir: &Path,
    caller_id: CallerId,
    chat_id: i64,
    text: &str,
    audio: &[u8],
) -> anyhow::Result<()> {
    let artifact = AudioArtifact::write(audio_dir, caller_id, text, audio).await?;
    messaging
        .send_voice(chat_id, artifact.path(), VOICE_CAPTION)
        .await?;
    tracing::info!(caller_id, "voice response sent");
    Ok(())
}
