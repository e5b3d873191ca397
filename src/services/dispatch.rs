use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedSender};

use crate::models::{CallerId, Command, InboundMessage};
use crate::services::conversation::{self, GENERIC_FALLBACK};
use crate::services::voice::sender::send_voice_response;
use crate::state::AppState;

pub const WELCOME_MESSAGE: &str = "Ciao! Sono l'assistente vocale del servizio clienti.\n\n\
Per poterti aiutare al meglio, ho bisogno di raccogliere alcune informazioni personali. \n\n\
Iniziamo: come ti chiami?";

pub const HELP_MESSAGE: &str = "Sono qui per aiutarti con:\n\n\
🔧 Supporto tecnico per problemi comuni\n\
📅 Prenotazione appuntamenti\n\n\
Parlami dei tuoi problemi o dimmi se vuoi prenotare un appuntamento!";

// One worker per caller; its messages are handled and answered in arrival order.
#[derive(Default)]
pub struct CallerQueues {
    workers: Mutex<HashMap<CallerId, UnboundedSender<InboundMessage>>>,
}

impl CallerQueues {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn enqueue(state: &Arc<AppState>, msg: InboundMessage) {
    let mut workers = state
        .queues
        .workers
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let caller_id = msg.caller_id;
    let msg = match workers.get(&caller_id) {
        Some(tx) => match tx.send(msg) {
            Ok(()) => return,
            Err(mpsc::error::SendError(msg)) => msg,
        },
        None => msg,
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _ = tx.send(msg);
    workers.insert(caller_id, tx);

    let state = Arc::clone(state);
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            handle_inbound(Arc::clone(&state), msg).await;
        }
    });
}

pub async fn reply_for(state: &Arc<AppState>, msg: &InboundMessage) -> String {
    match msg.command() {
        Some(Command::Start) => {
            state.sessions.reset(msg.caller_id, msg.chat_id);
            WELCOME_MESSAGE.to_string()
        }
        Some(Command::Help) => HELP_MESSAGE.to_string(),
        Some(Command::Unknown(name)) => {
            tracing::info!(caller_id = msg.caller_id, command = %name, "unknown command");
            HELP_MESSAGE.to_string()
        }
        None => run_turn(state, msg).await,
    }
}

pub async fn handle_inbound(state: Arc<AppState>, msg: InboundMessage) {
    tracing::info!(
        caller_id = msg.caller_id,
        chat_id = msg.chat_id,
        text = %msg.text,
        "inbound message"
    );

    let reply = reply_for(&state, &msg).await;
    send_voice_response(&state, msg.caller_id, msg.chat_id, &reply).await;
}

// Own task so a panic still yields a reply.
async fn run_turn(state: &Arc<AppState>, msg: &InboundMessage) -> String {
    let turn_state = Arc::clone(state);
    let (caller_id, chat_id, text) = (msg.caller_id, msg.chat_id, msg.text.clone());

    let turn = tokio::spawn(async move {
        conversation::process_message(&turn_state, caller_id, chat_id, &text).await
    });

    match turn.await {
        Ok(outcome) => outcome.reply,
        Err(e) => {
            tracing::error!(error = %e, caller_id, "conversation turn aborted");
            GENERIC_FALLBACK.to_string()
        }
    }
}
