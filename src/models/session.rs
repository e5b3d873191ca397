use serde::{Deserialize, Serialize};

use super::{AppointmentRequest, UserData};

pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CollectingData,
    ServiceMenu,
    BookingAppointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    ProfileCompleted,
    BookingRequested,
    BookingConfirmed,
    BookingFailed,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::CollectingData => "collecting_data",
            Step::ServiceMenu => "service_menu",
            Step::BookingAppointment => "booking_appointment",
        }
    }

    pub fn next(self, event: TurnEvent) -> Step {
        match (self, event) {
            (Step::CollectingData, TurnEvent::ProfileCompleted) => Step::ServiceMenu,
            (Step::ServiceMenu, TurnEvent::BookingRequested) => Step::BookingAppointment,
            (Step::BookingAppointment, TurnEvent::BookingConfirmed) => Step::ServiceMenu,
            (step, _) => step,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
}

pub type CallerId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSession {
    pub caller_id: CallerId,
    pub chat_id: i64,
    pub step: Step,
    pub user_data: UserData,
    pub appointment: Option<AppointmentRequest>,
    pub history: Vec<ConversationMessage>,
}

impl UserSession {
    pub fn new(caller_id: CallerId, chat_id: i64) -> Self {
        Self {
            caller_id,
            chat_id,
            step: Step::CollectingData,
            user_data: UserData::default(),
            appointment: None,
            history: Vec::new(),
        }
    }

    pub fn apply(&mut self, event: TurnEvent) {
        let next = self.step.next(event);
        if next != self.step {
            tracing::info!(
                caller_id = self.caller_id,
                from = self.step.as_str(),
                to = next.as_str(),
                "step transition"
            );
            self.step = next;
        }
    }

    pub fn record_exchange(&mut self, user: &str, assistant: &str) {
        self.history.push(ConversationMessage {
            role: "user".to_string(),
            content: user.to_string(),
        });
        self.history.push(ConversationMessage {
            role: "assistant".to_string(),
            content: assistant.to_string(),
        });
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }

    pub fn recent_history(&self, n: usize) -> &[ConversationMessage] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }
}
