use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDateTime;
use tower::ServiceExt;

use voicedesk::config::AppConfig;
use voicedesk::handlers;
use voicedesk::models::{InboundMessage, Step};
use voicedesk::services::ai::intent::KeywordIntent;
use voicedesk::services::ai::{ChatProfile, LlmProvider, Message};
use voicedesk::services::calendar::{CalendarProvider, NewEvent};
use voicedesk::services::conversation::{self, BOOKING_CONFIRMED, BOOKING_RETRY, GENERIC_FALLBACK};
use voicedesk::services::dispatch::{self, CallerQueues, HELP_MESSAGE, WELCOME_MESSAGE};
use voicedesk::services::messaging::MessagingProvider;
use voicedesk::services::sessions::SessionStore;
use voicedesk::services::voice::{TtsError, TtsProvider};
use voicedesk::state::AppState;

const REPLY: &str = "Certo, ti aiuto volentieri.";

const FULL_PROFILE: &str = "```json\n{\"first_name\":\"Anna\",\"last_name\":\"Rossi\",\"street_address\":\"Via Cantonale 12\",\"city_postal\":\"Lugano 6900\",\"phone\":\"+41791234567\",\"email\":\"anna@example.ch\"}\n```";

// ── Mock Providers ──

#[derive(Default)]
struct MockLlm {
    fail_replies: bool,
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn chat(
        &self,
        profile: ChatProfile,
        _system_prompt: &str,
        messages: &[Message],
    ) -> anyhow::Result<String> {
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");

        match profile {
            ChatProfile::Extraction => {
                // Deterministic extraction keyed on the user's words
                if last.contains("boom") {
                    panic!("extractor crashed");
                } else if last.contains("Anna") {
                    Ok(FULL_PROFILE.to_string())
                } else if last.contains("Luca") {
                    Ok(r#"{"first_name":"Luca","phone":"123"}"#.to_string())
                } else if last.contains("Rossi") {
                    Ok(r#"{"last_name":"Rossi"}"#.to_string())
                } else {
                    Ok("Non ho trovato dati.".to_string())
                }
            }
            ChatProfile::Reply if self.fail_replies => anyhow::bail!("rate limited"),
            ChatProfile::Reply => Ok(REPLY.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Text { chat_id: i64, text: String },
    Voice { chat_id: i64, caption: String },
}

struct MockMessaging {
    sent: Arc<Mutex<Vec<Sent>>>,
}

#[async_trait]
impl MessagingProvider for MockMessaging {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_voice(&self, chat_id: i64, audio: &Path, caption: &str) -> anyhow::Result<()> {
        assert!(audio.exists(), "audio must exist while it is being sent");
        self.sent.lock().unwrap().push(Sent::Voice {
            chat_id,
            caption: caption.to_string(),
        });
        Ok(())
    }
}

struct MockTts {
    result: Result<Vec<u8>, TtsError>,
}

#[async_trait]
impl TtsProvider for MockTts {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, TtsError> {
        self.result.clone()
    }

    async fn check_connection(&self) -> Result<(), TtsError> {
        Ok(())
    }
}

struct MockCalendar {
    busy: Vec<NaiveDateTime>,
    created: Arc<Mutex<Vec<NewEvent>>>,
}

#[async_trait]
impl CalendarProvider for MockCalendar {
    async fn check_availability(
        &self,
        start: NaiveDateTime,
        _duration_minutes: i64,
    ) -> anyhow::Result<bool> {
        Ok(!self.busy.contains(&start))
    }

    async fn create_event(&self, event: &NewEvent) -> anyhow::Result<Option<String>> {
        self.created.lock().unwrap().push(event.clone());
        Ok(Some("https://calendar.google.com/event?eid=test".to_string()))
    }

    async fn cancel_event(&self, _event_id: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

// ── Helpers ──

struct TestSetup {
    fail_replies: bool,
    tts: Result<Vec<u8>, TtsError>,
    busy: Vec<NaiveDateTime>,
    webhook_secret: Option<&'static str>,
    dev_endpoints: bool,
}

impl Default for TestSetup {
    fn default() -> Self {
        Self {
            fail_replies: false,
            tts: Ok(vec![0xff, 0xf3, 0x00]),
            busy: vec![],
            webhook_secret: None,
            dev_endpoints: true,
        }
    }
}

struct Harness {
    state: Arc<AppState>,
    sent: Arc<Mutex<Vec<Sent>>>,
    created: Arc<Mutex<Vec<NewEvent>>>,
    _audio_dir: tempfile::TempDir,
}

fn test_config(setup: &TestSetup, audio_dir: &Path) -> AppConfig {
    let audio_dir = audio_dir.display().to_string();
    AppConfig::from_lookup(|key| {
        let value = match key {
            "TELEGRAM_TOKEN" => "123:test",
            "OPENAI_API_KEY" => "sk-test",
            "ELEVENLABS_API_KEY" => "el-test",
            "VOICE_ID" => "voice-test",
            "GOOGLE_CREDENTIALS_JSON" => {
                r#"{"client_email":"bot@test.iam.gserviceaccount.com","private_key":"unused"}"#
            }
            "CALENDAR_ID" => "primary",
            "AUDIO_TEMP_DIR" => audio_dir.as_str(),
            "DEV_ENDPOINTS" if setup.dev_endpoints => "true",
            "TELEGRAM_WEBHOOK_SECRET" => setup.webhook_secret?,
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

fn harness(setup: TestSetup) -> Harness {
    let audio_dir = tempfile::tempdir().unwrap();
    let sent = Arc::new(Mutex::new(vec![]));
    let created = Arc::new(Mutex::new(vec![]));

    let state = Arc::new(AppState {
        config: test_config(&setup, audio_dir.path()),
        sessions: SessionStore::new(),
        queues: CallerQueues::new(),
        llm: Box::new(MockLlm {
            fail_replies: setup.fail_replies,
        }),
        messaging: Box::new(MockMessaging {
            sent: Arc::clone(&sent),
        }),
        tts: Box::new(MockTts { result: setup.tts }),
        calendar: Box::new(MockCalendar {
            busy: setup.busy,
            created: Arc::clone(&created),
        }),
        intent: Box::new(KeywordIntent::italian()),
    });

    Harness {
        state,
        sent,
        created,
        _audio_dir: audio_dir,
    }
}

fn test_state() -> Harness {
    harness(TestSetup::default())
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::health::health))
        .route("/health", get(handlers::health::health))
        .route("/webhook/telegram", post(handlers::webhook::telegram_webhook))
        .route("/api/dev/message", post(handlers::dev::send_message))
        .with_state(state)
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn dev_message(app: &Router, caller_id: i64, message: &str) -> serde_json::Value {
    let res = app
        .clone()
        .oneshot(json_request(
            "/api/dev/message",
            serde_json::json!({ "caller_id": caller_id, "message": message }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn text_update(update_id: i64, user_id: i64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "from": { "id": user_id, "is_bot": false, "first_name": "Anna" },
            "chat": { "id": user_id, "type": "private" },
            "date": 1700000000,
            "text": text
        }
    })
}

/// Background turns finish asynchronously; wait until `count` messages were sent.
async fn wait_for_sent(sent: &Arc<Mutex<Vec<Sent>>>, count: usize) -> Vec<Sent> {
    for _ in 0..100 {
        let current = sent.lock().unwrap().clone();
        if current.len() >= count {
            return current;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    sent.lock().unwrap().clone()
}

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

// ── Health Check ──

#[tokio::test]
async fn test_health() {
    let h = test_state();
    h.state.sessions.get_or_create(1, 1);
    let app = test_app(Arc::clone(&h.state));

    for uri in ["/health", "/"] {
        let res = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["sessions"], 1);
    }
}

// ── Conversation Flow ──

#[tokio::test]
async fn test_full_conversation_books_appointment() {
    let h = test_state();
    let app = test_app(Arc::clone(&h.state));

    let json = dev_message(&app, 7, "/start").await;
    assert_eq!(json["reply"], WELCOME_MESSAGE);
    assert_eq!(json["step"], "collecting_data");

    let json = dev_message(&app, 7, "Sono Anna Rossi, Via Cantonale 12, Lugano 6900").await;
    assert_eq!(json["reply"], REPLY);
    assert_eq!(json["step"], "service_menu");

    let json = dev_message(&app, 7, "Vorrei prenotare un appuntamento").await;
    assert_eq!(json["step"], "booking_appointment");
    {
        let session = h.state.sessions.get_or_create(7, 7);
        let session = session.lock().await;
        let request = session.appointment.as_ref().unwrap();
        assert_eq!(request.user_data, session.user_data);
        assert!(request.reason.is_none());
    }

    let json = dev_message(&app, 7, "il 15/03/2025 alle 14 perché la caldaia perde").await;
    assert_eq!(json["reply"], BOOKING_CONFIRMED);
    assert_eq!(json["step"], "service_menu");

    let created = h.created.lock().unwrap().clone();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].summary, "Appuntamento - Anna Rossi");
    assert_eq!(created[0].start, dt("2025-03-15 14:00"));
    assert_eq!(created[0].end, dt("2025-03-15 15:00"));
}

#[tokio::test]
async fn test_partial_data_stays_in_collecting() {
    let h = test_state();

    let outcome = conversation::process_message(&h.state, 3, 3, "Mi chiamo Rossi").await;
    assert_eq!(outcome.reply, REPLY);
    assert_eq!(outcome.step, Step::CollectingData);

    let session = h.state.sessions.get_or_create(3, 3);
    let session = session.lock().await;
    assert_eq!(session.user_data.last_name.as_deref(), Some("Rossi"));
    assert_eq!(session.user_data.missing_fields().len(), 5);
    assert_eq!(session.history.len(), 2);
}

#[tokio::test]
async fn test_invalid_phone_rejected_without_changes() {
    let h = test_state();

    let outcome = conversation::process_message(&h.state, 4, 4, "Sono Luca, tel 123").await;
    assert_eq!(
        outcome.reply,
        "Numero di telefono svizzero non valido. Formato: +41XXXXXXXXX o 0XXXXXXXXX"
    );
    assert_eq!(outcome.step, Step::CollectingData);

    let session = h.state.sessions.get_or_create(4, 4);
    let session = session.lock().await;
    assert!(session.user_data.first_name.is_none());
    assert!(session.user_data.phone.is_none());
    assert!(session.history.is_empty());
}

#[tokio::test]
async fn test_complete_profile_moves_to_menu_on_any_message() {
    let h = test_state();
    {
        let session = h.state.sessions.get_or_create(5, 5);
        let mut session = session.lock().await;
        session.user_data.first_name = Some("Anna".into());
        session.user_data.last_name = Some("Rossi".into());
        session.user_data.street_address = Some("Via Cantonale 12".into());
        session.user_data.city_postal = Some("Lugano 6900".into());
        session.user_data.phone = Some("0791234567".into());
        session.user_data.email = Some("anna@example.ch".into());
    }

    let outcome = conversation::process_message(&h.state, 5, 5, "ok").await;
    assert_eq!(outcome.step, Step::ServiceMenu);
}

#[tokio::test]
async fn test_menu_without_booking_keyword_stays() {
    let h = test_state();
    conversation::process_message(&h.state, 6, 6, "Anna").await;

    let outcome = conversation::process_message(&h.state, 6, 6, "La lavatrice non parte").await;
    assert_eq!(outcome.step, Step::ServiceMenu);
    assert_eq!(outcome.reply, REPLY);

    let session = h.state.sessions.get_or_create(6, 6);
    assert!(session.lock().await.appointment.is_none());
}

#[tokio::test]
async fn test_unavailable_slot_offers_free_hours() {
    let h = harness(TestSetup {
        busy: vec![dt("2025-03-15 14:00"), dt("2025-03-15 09:00")],
        ..Default::default()
    });

    conversation::process_message(&h.state, 8, 8, "Anna").await;
    conversation::process_message(&h.state, 8, 8, "voglio un appuntamento").await;
    let outcome = conversation::process_message(
        &h.state,
        8,
        8,
        "2025-03-15 alle 14 per la caldaia rotta",
    )
    .await;

    assert_eq!(outcome.step, Step::BookingAppointment);
    assert!(outcome.reply.starts_with(BOOKING_RETRY));
    assert!(outcome.reply.contains("10:00"));
    assert!(!outcome.reply.contains("09:00"));
    assert!(!outcome.reply.contains("14:00"));
    assert!(h.created.lock().unwrap().is_empty());

    let session = h.state.sessions.get_or_create(8, 8);
    let session = session.lock().await;
    let request = session.appointment.as_ref().unwrap();
    assert!(request.preferred_date.is_none());
    assert!(request.preferred_time.is_none());
    assert_eq!(request.reason.as_deref(), Some("2025-03-15 alle 14 per la caldaia rotta"));
}

#[tokio::test]
async fn test_booking_collects_slot_over_several_turns() {
    let h = test_state();
    conversation::process_message(&h.state, 9, 9, "Anna").await;
    conversation::process_message(&h.state, 9, 9, "prenotazione").await;

    let outcome = conversation::process_message(&h.state, 9, 9, "2025-04-02").await;
    assert_eq!(outcome.step, Step::BookingAppointment);
    assert_eq!(outcome.reply, REPLY);

    let outcome = conversation::process_message(&h.state, 9, 9, "alle 10").await;
    assert_eq!(outcome.step, Step::BookingAppointment);

    let outcome =
        conversation::process_message(&h.state, 9, 9, "controllo annuale della caldaia").await;
    assert_eq!(outcome.reply, BOOKING_CONFIRMED);
    assert_eq!(outcome.step, Step::ServiceMenu);
    assert_eq!(h.created.lock().unwrap()[0].start, dt("2025-04-02 10:00"));
}

#[tokio::test]
async fn test_time_skipped_by_clock_change_asks_for_new_slot() {
    let h = test_state();
    conversation::process_message(&h.state, 13, 13, "Anna").await;
    conversation::process_message(&h.state, 13, 13, "voglio un appuntamento").await;

    let outcome =
        conversation::process_message(&h.state, 13, 13, "il 30/03/2025 alle 2:30 per la caldaia")
            .await;
    assert_eq!(outcome.step, Step::BookingAppointment);
    assert!(outcome.reply.starts_with(BOOKING_RETRY));
    assert!(outcome.reply.contains("Orari liberi il 30/03/2025: 09:00"));
    assert!(h.created.lock().unwrap().is_empty());

    let outcome =
        conversation::process_message(&h.state, 13, 13, "allora il 31/03/2025 alle 10:00").await;
    assert_eq!(outcome.reply, BOOKING_CONFIRMED);
    assert_eq!(outcome.step, Step::ServiceMenu);

    let created = h.created.lock().unwrap().clone();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].start, dt("2025-03-31 10:00"));
    assert!(created[0].description.contains("Motivo: il 30/03/2025 alle 2:30 per la caldaia"));
}

#[tokio::test]
async fn test_reply_failure_uses_fallback() {
    let h = harness(TestSetup {
        fail_replies: true,
        ..Default::default()
    });

    let outcome = conversation::process_message(&h.state, 10, 10, "Rossi").await;
    assert_eq!(
        outcome.reply,
        "Mi dispiace, ho avuto un problema tecnico. Puoi ripetere per favore?"
    );
    let session = h.state.sessions.get_or_create(10, 10);
    let session = session.lock().await;
    assert_eq!(session.user_data.last_name.as_deref(), Some("Rossi"));
    assert!(session.history.is_empty());
}

#[tokio::test]
async fn test_crashed_turn_gets_generic_reply_and_keeps_session() {
    let h = test_state();
    conversation::process_message(&h.state, 14, 14, "Mi chiamo Rossi").await;

    let reply = dispatch::reply_for(
        &h.state,
        &InboundMessage {
            caller_id: 14,
            chat_id: 14,
            text: "boom".to_string(),
        },
    )
    .await;
    assert_eq!(reply, GENERIC_FALLBACK);

    {
        let session = h.state.sessions.get_or_create(14, 14);
        let session = session.lock().await;
        assert_eq!(session.step, Step::CollectingData);
        assert_eq!(session.user_data.last_name.as_deref(), Some("Rossi"));
        assert_eq!(session.history.len(), 2);
    }

    let outcome = conversation::process_message(&h.state, 14, 14, "Sono Anna").await;
    assert_eq!(outcome.step, Step::ServiceMenu);
}

#[tokio::test]
async fn test_start_resets_session() {
    let h = test_state();
    let app = test_app(Arc::clone(&h.state));

    dev_message(&app, 11, "Anna").await;
    let json = dev_message(&app, 11, "/start@voicedesk_bot").await;
    assert_eq!(json["reply"], WELCOME_MESSAGE);
    assert_eq!(json["step"], "collecting_data");

    let session = h.state.sessions.get_or_create(11, 11);
    assert!(session.lock().await.user_data.first_name.is_none());
}

#[tokio::test]
async fn test_help_and_unknown_commands() {
    let h = test_state();
    let app = test_app(Arc::clone(&h.state));

    assert_eq!(dev_message(&app, 12, "/help").await["reply"], HELP_MESSAGE);
    assert_eq!(dev_message(&app, 12, "/settings").await["reply"], HELP_MESSAGE);
}

// ── Dev Endpoint ──

#[tokio::test]
async fn test_dev_endpoint_disabled() {
    let h = harness(TestSetup {
        dev_endpoints: false,
        ..Default::default()
    });
    let res = test_app(Arc::clone(&h.state))
        .oneshot(json_request(
            "/api/dev/message",
            serde_json::json!({ "caller_id": 1, "message": "ciao" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dev_endpoint_rejects_empty_message() {
    let h = test_state();
    let res = test_app(Arc::clone(&h.state))
        .oneshot(json_request(
            "/api/dev/message",
            serde_json::json!({ "caller_id": 1, "message": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ── Telegram Webhook ──

#[tokio::test]
async fn test_webhook_sends_voice_reply() {
    let h = test_state();
    let res = test_app(Arc::clone(&h.state))
        .oneshot(json_request("/webhook/telegram", text_update(1, 555, "/start")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let sent = wait_for_sent(&h.sent, 1).await;
    assert_eq!(
        sent,
        vec![Sent::Voice {
            chat_id: 555,
            caption: "🎵 Risposta vocale".to_string()
        }]
    );
}

#[tokio::test]
async fn test_webhook_secret_enforced() {
    let h = harness(TestSetup {
        webhook_secret: Some("s3cret"),
        ..Default::default()
    });
    let app = test_app(Arc::clone(&h.state));

    let res = app
        .clone()
        .oneshot(json_request("/webhook/telegram", text_update(1, 1, "ciao")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let mut req = json_request("/webhook/telegram", text_update(2, 1, "/help"));
    req.headers_mut()
        .insert("x-telegram-bot-api-secret-token", "s3cret".parse().unwrap());
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(wait_for_sent(&h.sent, 1).await.len(), 1);
}

#[tokio::test]
async fn test_webhook_ignores_non_text_updates() {
    let h = test_state();
    let update = serde_json::json!({
        "update_id": 3,
        "message": {
            "message_id": 3,
            "from": { "id": 9 },
            "chat": { "id": 9 },
            "sticker": { "file_id": "abc" }
        }
    });
    let res = test_app(Arc::clone(&h.state))
        .oneshot(json_request("/webhook/telegram", update))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.sent.lock().unwrap().is_empty());
    assert!(h.state.sessions.is_empty());
}

#[tokio::test]
async fn test_webhook_keeps_caller_order() {
    let h = harness(TestSetup {
        tts: Err(TtsError::Other("offline".to_string())),
        ..Default::default()
    });
    let app = test_app(Arc::clone(&h.state));

    for (update_id, text) in [(1, "/start"), (2, "Sono Anna Rossi, Via Cantonale 12")] {
        let res = app
            .clone()
            .oneshot(json_request("/webhook/telegram", text_update(update_id, 60, text)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let sent = wait_for_sent(&h.sent, 2).await;
    assert_eq!(sent.len(), 2);
    let texts: Vec<&str> = sent
        .iter()
        .map(|s| match s {
            Sent::Text { text, .. } => text.as_str(),
            Sent::Voice { .. } => panic!("voice is offline"),
        })
        .collect();
    assert!(texts[0].contains(WELCOME_MESSAGE));
    assert!(texts[1].contains(REPLY));

    let session = h.state.sessions.get_or_create(60, 60);
    let session = session.lock().await;
    assert_eq!(session.step, Step::ServiceMenu);
    assert_eq!(session.user_data.first_name.as_deref(), Some("Anna"));
}

// ── Voice Fallback ──

#[tokio::test]
async fn test_tts_credentials_failure_sends_text() {
    let h = harness(TestSetup {
        tts: Err(TtsError::InvalidCredentials),
        ..Default::default()
    });

    dispatch::handle_inbound(
        Arc::clone(&h.state),
        InboundMessage {
            caller_id: 20,
            chat_id: 21,
            text: "/help".to_string(),
        },
    )
    .await;

    let sent = h.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![Sent::Text {
            chat_id: 21,
            text: format!(
                "🔊 {HELP_MESSAGE}\n\n⚠️ Servizio vocale temporaneamente non disponibile (problema configurazione)"
            ),
        }]
    );
}

#[tokio::test]
async fn test_same_caller_turns_are_serialized() {
    let h = test_state();

    let a = tokio::spawn({
        let state = Arc::clone(&h.state);
        async move { conversation::process_message(&state, 30, 30, "Rossi").await }
    });
    let b = tokio::spawn({
        let state = Arc::clone(&h.state);
        async move { conversation::process_message(&state, 30, 30, "Rossi").await }
    });
    a.await.unwrap();
    b.await.unwrap();

    assert_eq!(h.state.sessions.len(), 1);
    let session = h.state.sessions.get_or_create(30, 30);
    assert_eq!(session.lock().await.history.len(), 4);
}
