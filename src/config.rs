use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::services::calendar::google::ServiceAccountKey;

const REQUIRED_VARS: [&str; 6] = [
    "TELEGRAM_TOKEN",
    "OPENAI_API_KEY",
    "ELEVENLABS_API_KEY",
    "VOICE_ID",
    "GOOGLE_CREDENTIALS_JSON",
    "CALENDAR_ID",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TelegramMode {
    Polling,
    Webhook,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub telegram_token: String,
    pub telegram_mode: TelegramMode,
    pub telegram_webhook_url: Option<String>,
    pub telegram_webhook_secret: Option<String>,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_extraction_model: String,
    pub elevenlabs_api_key: String,
    pub voice_id: String,
    pub google_credentials: ServiceAccountKey,
    pub calendar_id: String,
    pub audio_dir: PathBuf,
    pub external_call_timeout: Duration,
    pub dev_endpoints: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<String> = REQUIRED_VARS
            .into_iter()
            .filter(|&key| get(key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing));
        }
        let required = |key: &str| get(key).unwrap_or_default();

        let google_credentials: ServiceAccountKey =
            serde_json::from_str(&required("GOOGLE_CREDENTIALS_JSON"))
                .map_err(|e| ConfigError::InvalidCredentials(e.to_string()))?;

        let port = match get("PORT") {
            Some(v) => v.parse().map_err(|_| invalid("PORT", "expected a port number"))?,
            None => 8000,
        };

        let telegram_mode = match get("TELEGRAM_MODE").map(|v| v.to_lowercase()).as_deref() {
            None | Some("polling") => TelegramMode::Polling,
            Some("webhook") => TelegramMode::Webhook,
            Some(_) => return Err(invalid("TELEGRAM_MODE", "expected polling or webhook")),
        };

        let timeout_secs: u64 = match get("EXTERNAL_CALL_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| invalid("EXTERNAL_CALL_TIMEOUT_SECS", "expected a positive integer"))?,
            None => 30,
        };

        let dev_endpoints = matches!(
            get("DEV_ENDPOINTS").map(|v| v.to_lowercase()).as_deref(),
            Some("1" | "true" | "yes")
        );

        Ok(Self {
            port,
            telegram_token: required("TELEGRAM_TOKEN"),
            telegram_mode,
            telegram_webhook_url: get("TELEGRAM_WEBHOOK_URL"),
            telegram_webhook_secret: get("TELEGRAM_WEBHOOK_SECRET"),
            openai_api_key: required("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-4".to_string()),
            openai_extraction_model: get("OPENAI_EXTRACTION_MODEL")
                .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            elevenlabs_api_key: required("ELEVENLABS_API_KEY"),
            voice_id: required("VOICE_ID"),
            google_credentials,
            calendar_id: required("CALENDAR_ID"),
            audio_dir: get("AUDIO_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join("voicedesk")),
            external_call_timeout: Duration::from_secs(timeout_secs),
            dev_endpoints,
        })
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
