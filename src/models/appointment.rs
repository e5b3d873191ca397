use serde::{Deserialize, Serialize};

use super::UserData;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentRequest {
    pub user_data: UserData,
    // YYYY-MM-DD
    pub preferred_date: Option<String>,
    // HH:MM, 24h
    pub preferred_time: Option<String>,
    pub reason: Option<String>,
}

impl AppointmentRequest {
    pub fn new(user_data: UserData) -> Self {
        Self {
            user_data,
            preferred_date: None,
            preferred_time: None,
            reason: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.user_data.is_complete()
            && self.preferred_date.is_some()
            && self.preferred_time.is_some()
            && self.reason.is_some()
    }

    pub fn offer_reason(&mut self, text: &str) -> bool {
        if text.split_whitespace().count() > 2 {
            self.reason = Some(text.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_slot(&mut self) {
        self.preferred_date = None;
        self.preferred_time = None;
    }
}
