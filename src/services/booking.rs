use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::models::AppointmentRequest;
use crate::services::calendar::{Attendee, CalendarProvider, NewEvent, Reminder, ReminderMethod};

pub const APPOINTMENT_MINUTES: i64 = 60;
pub const TIME_ZONE: &str = "Europe/Zurich";
const ZONE: Tz = chrono_tz::Europe::Zurich;

pub const OPENING_HOUR: u32 = 9;
pub const CLOSING_HOUR: u32 = 17;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("appointment request is incomplete or has an unreadable date/time")]
    InvalidRequest,

    #[error("slot {0} is not available")]
    Unavailable(NaiveDateTime),

    #[error("slot {0} does not exist in Europe/Zurich")]
    NonexistentTime(NaiveDateTime),

    #[error("calendar error: {0}")]
    Calendar(String),

    #[error("calendar did not return an event reference")]
    NotCreated,
}

pub fn slot_start(request: &AppointmentRequest) -> Option<NaiveDateTime> {
    let date = request.preferred_date.as_deref()?;
    let time = request.preferred_time.as_deref()?;
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").ok()
}

pub fn build_event(request: &AppointmentRequest) -> Option<NewEvent> {
    let start = slot_start(request)?;
    let user = &request.user_data;
    let name = user.full_name();
    let field = |v: &Option<String>| v.clone().unwrap_or_default();

    let description = format!(
        "Motivo: {reason}\n\n\
         Dettagli cliente:\n\
         Nome: {name}\n\
         Telefono: {phone}\n\
         Email: {email}\n\
         Indirizzo: {street}, {city}\n\n\
         Prenotato tramite bot Telegram",
        reason = field(&request.reason),
        phone = field(&user.phone),
        email = field(&user.email),
        street = field(&user.street_address),
        city = field(&user.city_postal),
    );

    let attendees = user
        .email
        .iter()
        .map(|email| Attendee {
            email: email.clone(),
            display_name: name.clone(),
        })
        .collect();

    Some(NewEvent {
        summary: format!("Appuntamento - {name}"),
        description,
        start,
        end: start + Duration::minutes(APPOINTMENT_MINUTES),
        time_zone: TIME_ZONE.to_string(),
        attendees,
        reminders: vec![
            Reminder {
                method: ReminderMethod::Email,
                minutes: 24 * 60,
            },
            Reminder {
                method: ReminderMethod::Popup,
                minutes: 60,
            },
        ],
    })
}

fn exists_locally(local: NaiveDateTime) -> bool {
    ZONE.from_local_datetime(&local).earliest().is_some()
}

pub async fn book(
    calendar: &dyn CalendarProvider,
    request: &AppointmentRequest,
) -> Result<String, BookingError> {
    if !request.is_complete() {
        return Err(BookingError::InvalidRequest);
    }
    let event = build_event(request).ok_or(BookingError::InvalidRequest)?;
    // skipped by the spring-forward clock change
    if !exists_locally(event.start) || !exists_locally(event.end) {
        return Err(BookingError::NonexistentTime(event.start));
    }

    let available = calendar
        .check_availability(event.start, APPOINTMENT_MINUTES)
        .await
        .map_err(|e| BookingError::Calendar(format!("{e:#}")))?;
    if !available {
        return Err(BookingError::Unavailable(event.start));
    }

    match calendar.create_event(&event).await {
        Ok(Some(reference)) if !reference.is_empty() => {
            tracing::info!(start = %event.start, reference = %reference, "appointment booked");
            Ok(reference)
        }
        Ok(_) => Err(BookingError::NotCreated),
        Err(e) => Err(BookingError::Calendar(format!("{e:#}"))),
    }
}

// Hours whose check fails count as busy.
pub async fn available_slots(
    calendar: &dyn CalendarProvider,
    date: NaiveDate,
    start_hour: u32,
    end_hour: u32,
) -> Vec<String> {
    let mut slots = Vec::new();
    for hour in start_hour..end_hour {
        let Some(start) = date.and_hms_opt(hour, 0, 0) else {
            continue;
        };
        match calendar.check_availability(start, APPOINTMENT_MINUTES).await {
            Ok(true) => slots.push(format!("{hour:02}:00")),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(error = %e, %start, "slot check failed");
            }
        }
    }
    slots
}
