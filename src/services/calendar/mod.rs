pub mod google;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Email,
    Popup,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub method: ReminderMethod,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attendee {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub time_zone: String,
    pub attendees: Vec<Attendee>,
    pub reminders: Vec<Reminder>,
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn check_availability(
        &self,
        start: NaiveDateTime,
        duration_minutes: i64,
    ) -> anyhow::Result<bool>;

    async fn create_event(&self, event: &NewEvent) -> anyhow::Result<Option<String>>;

    async fn cancel_event(&self, event_id: &str) -> anyhow::Result<()>;
}
