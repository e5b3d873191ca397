use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use voicedesk::config::{AppConfig, TelegramMode};
use voicedesk::handlers;
use voicedesk::services::ai::intent::KeywordIntent;
use voicedesk::services::ai::openai::OpenAiProvider;
use voicedesk::services::dispatch::CallerQueues;
use voicedesk::services::calendar::google::GoogleCalendarProvider;
use voicedesk::services::messaging::polling;
use voicedesk::services::messaging::telegram::TelegramProvider;
use voicedesk::services::sessions::SessionStore;
use voicedesk::services::voice::elevenlabs::ElevenLabsProvider;
use voicedesk::services::voice::sender::cleanup_audio_dir;
use voicedesk::services::voice::TtsProvider;
use voicedesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration, not starting");
            return Err(e.into());
        }
    };
    let timeout = config.external_call_timeout;

    tracing::info!(
        reply_model = %config.openai_model,
        extraction_model = %config.openai_extraction_model,
        "using OpenAI LLM provider"
    );
    let llm = OpenAiProvider::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
        config.openai_extraction_model.clone(),
        timeout,
    )?;

    let tts = ElevenLabsProvider::new(
        config.elevenlabs_api_key.clone(),
        config.voice_id.clone(),
        timeout,
    )?;
    match tts.check_connection().await {
        Ok(()) => tracing::info!(voice_id = %config.voice_id, "ElevenLabs connection verified"),
        Err(e) => tracing::warn!(error = %e, "ElevenLabs check failed, replies will fall back to text"),
    }

    let calendar = GoogleCalendarProvider::new(
        config.google_credentials.clone(),
        config.calendar_id.clone(),
        chrono_tz::Europe::Zurich,
        timeout,
    )?;

    let telegram = TelegramProvider::new(config.telegram_token.clone(), timeout)?;

    let state = Arc::new(AppState {
        config: config.clone(),
        sessions: SessionStore::new(),
        queues: CallerQueues::new(),
        llm: Box::new(llm),
        messaging: Box::new(telegram.clone()),
        tts: Box::new(tts),
        calendar: Box::new(calendar),
        intent: Box::new(KeywordIntent::italian()),
    });

    match config.telegram_mode {
        TelegramMode::Polling => {
            polling::start(Arc::new(telegram), Arc::clone(&state));
        }
        TelegramMode::Webhook => match config.telegram_webhook_url.as_deref() {
            Some(url) => {
                telegram
                    .set_webhook(url, config.telegram_webhook_secret.as_deref())
                    .await?
            }
            None => tracing::warn!(
                "TELEGRAM_WEBHOOK_URL not set, assuming the webhook is registered externally"
            ),
        },
    }

    if config.dev_endpoints {
        tracing::warn!("dev endpoints enabled");
    }

    let app = Router::new()
        .route("/", get(handlers::health::health))
        .route("/health", get(handlers::health::health))
        .route("/webhook/telegram", post(handlers::webhook::telegram_webhook))
        .route("/api/dev/message", post(handlers::dev::send_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match cleanup_audio_dir(&config.audio_dir).await {
        Ok(removed) => tracing::info!(removed, dir = %config.audio_dir.display(), "cleaned up audio files"),
        Err(e) => tracing::warn!(error = %e, "failed to clean up audio directory"),
    }
    tracing::info!("shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
