use crate::config::AppConfig;
use crate::services::ai::intent::BookingIntent;
use crate::services::ai::LlmProvider;
use crate::services::calendar::CalendarProvider;
use crate::services::dispatch::CallerQueues;
use crate::services::messaging::MessagingProvider;
use crate::services::sessions::SessionStore;
use crate::services::voice::TtsProvider;

pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionStore,
    pub queues: CallerQueues,
    pub llm: Box<dyn LlmProvider>,
    pub messaging: Box<dyn MessagingProvider>,
    pub tts: Box<dyn TtsProvider>,
    pub calendar: Box<dyn CalendarProvider>,
    pub intent: Box<dyn BookingIntent>,
}
