use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::models::{CallerId, UserSession};

pub type SharedSession = Arc<tokio::sync::Mutex<UserSession>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<CallerId, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Lookup and insert under one lock so concurrent first messages share a session.
    pub fn get_or_create(&self, caller_id: CallerId, chat_id: i64) -> SharedSession {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(caller_id)
            .or_insert_with(|| {
                tracing::info!(caller_id, "new session");
                Arc::new(tokio::sync::Mutex::new(UserSession::new(caller_id, chat_id)))
            })
            .clone()
    }

    pub fn reset(&self, caller_id: CallerId, chat_id: i64) -> SharedSession {
        let session = Arc::new(tokio::sync::Mutex::new(UserSession::new(caller_id, chat_id)));
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(caller_id, Arc::clone(&session));
        tracing::info!(caller_id, "session reset");
        session
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
