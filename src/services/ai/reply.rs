use crate::models::UserSession;
use crate::services::ai::prompts::system_prompt;
use crate::services::ai::{ChatProfile, LlmProvider, Message};

pub const CONTEXT_WINDOW: usize = 10;

pub const REPLY_FALLBACK: &str = "Mi dispiace, ho avuto un problema tecnico. Puoi ripetere per favore?";

pub async fn generate_reply(llm: &dyn LlmProvider, session: &mut UserSession, message: &str) -> String {
    let system = system_prompt(session);

    let mut messages: Vec<Message> = session
        .recent_history(CONTEXT_WINDOW)
        .iter()
        .map(|m| Message {
            role: m.role.clone(),
            content: m.content.clone(),
        })
        .collect();
    messages.push(Message {
        role: "user".to_string(),
        content: message.to_string(),
    });

    match llm.chat(ChatProfile::Reply, &system, &messages).await {
        Ok(reply) => {
            session.record_exchange(message, &reply);
            reply
        }
        Err(e) => {
            tracing::error!(error = %e, caller_id = session.caller_id, "reply generation failed");
            REPLY_FALLBACK.to_string()
        }
    }
}
