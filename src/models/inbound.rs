use super::CallerId;

#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub caller_id: CallerId,
    pub chat_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Unknown(String),
}

impl InboundMessage {
    pub fn command(&self) -> Option<Command> {
        let first = self.text.trim().split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name).to_lowercase();
        Some(match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            _ => Command::Unknown(name),
        })
    }
}
