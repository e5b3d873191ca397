use chrono::NaiveDateTime;

use crate::models::{AppointmentRequest, CallerId, Step, TurnEvent, UserSession};
use crate::services::ai::extraction::extract_user_fields;
use crate::services::ai::reply::generate_reply;
use crate::services::booking::{self, BookingError, CLOSING_HOUR, OPENING_HOUR};
use crate::services::datetime::{extract_date, extract_time};
use crate::state::AppState;

pub const BOOKING_CONFIRMED: &str =
    "Perfetto! Il tuo appuntamento è stato confermato. Riceverai una email di conferma a breve.";
pub const BOOKING_RETRY: &str =
    "Mi dispiace, non sono riuscito a prenotare l'appuntamento. Vuoi provare con un'altra data o ora?";
pub const GENERIC_FALLBACK: &str = "Mi dispiace, c'è stato un errore. Puoi riprovare per favore?";

#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub reply: String,
    pub step: Step,
}

pub async fn process_message(
    state: &AppState,
    caller_id: CallerId,
    chat_id: i64,
    text: &str,
) -> TurnOutcome {
    let session = state.sessions.get_or_create(caller_id, chat_id);
    let mut session = session.lock().await;
    let step = session.step;

    tracing::info!(caller_id, step = step.as_str(), "processing message");

    let reply = match step {
        Step::CollectingData => collect_data(state, &mut session, text).await,
        Step::ServiceMenu => service_menu(state, &mut session, text).await,
        Step::BookingAppointment => book_appointment(state, &mut session, text).await,
    };

    TurnOutcome {
        reply,
        step: session.step,
    }
}

async fn collect_data(
    state: &AppState,
    session: &mut UserSession,
    text: &str,
) -> String {
    let updates = extract_user_fields(state.llm.as_ref(), text, &session.user_data).await;

    match session.user_data.with_updates(&updates) {
        Ok(updated) => session.user_data = updated,
        Err(e) => {
            tracing::info!(
                caller_id = session.caller_id,
                field = e.field.as_str(),
                "rejected field value"
            );
            return e.to_string();
        }
    }

    if session.user_data.is_complete() {
        session.apply(TurnEvent::ProfileCompleted);
    }

    generate_reply(state.llm.as_ref(), session, text).await
}

async fn service_menu(
    state: &AppState,
    session: &mut UserSession,
    text: &str,
) -> String {
    if state.intent.wants_booking(text) {
        session.appointment = Some(AppointmentRequest::new(session.user_data.clone()));
        session.apply(TurnEvent::BookingRequested);
    }

    generate_reply(state.llm.as_ref(), session, text).await
}

// Reply first; only a booking attempt replaces it.
async fn book_appointment(
    state: &AppState,
    session: &mut UserSession,
    text: &str,
) -> String {
    let reply = generate_reply(state.llm.as_ref(), session, text).await;

    let user_data = session.user_data.clone();
    let request = session
        .appointment
        .get_or_insert_with(|| AppointmentRequest::new(user_data));

    if request.preferred_date.is_none() {
        request.preferred_date = extract_date(text);
    }
    if request.preferred_time.is_none() {
        request.preferred_time = extract_time(text);
    }
    if request.reason.is_none() {
        request.offer_reason(text);
    }

    if !request.is_complete() {
        return reply;
    }

    let (reply, event) = match booking::book(state.calendar.as_ref(), request).await {
        Ok(reference) => {
            tracing::info!(caller_id = session.caller_id, reference = %reference, "booking confirmed");
            (BOOKING_CONFIRMED.to_string(), TurnEvent::BookingConfirmed)
        }
        Err(BookingError::Unavailable(start) | BookingError::NonexistentTime(start)) => {
            tracing::info!(caller_id = session.caller_id, %start, "requested slot cannot be booked");
            request.clear_slot();
            let free = booking::available_slots(
                state.calendar.as_ref(),
                start.date(),
                OPENING_HOUR,
                CLOSING_HOUR,
            )
            .await;
            (retry_with_slots(start, &free), TurnEvent::BookingFailed)
        }
        Err(e) => {
            tracing::warn!(caller_id = session.caller_id, error = %e, "booking failed");
            request.clear_slot();
            (BOOKING_RETRY.to_string(), TurnEvent::BookingFailed)
        }
    };

    session.apply(event);
    reply
}

fn retry_with_slots(start: NaiveDateTime, free: &[String]) -> String {
    if free.is_empty() {
        return BOOKING_RETRY.to_string();
    }
    format!(
        "{BOOKING_RETRY}\nOrari liberi il {}: {}",
        start.format("%d/%m/%Y"),
        free.join(", ")
    )
}
