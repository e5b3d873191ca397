pub mod appointment;
pub mod inbound;
pub mod session;
pub mod user_data;

pub use appointment::AppointmentRequest;
pub use inbound::{Command, InboundMessage};
pub use session::{CallerId, ConversationMessage, Step, TurnEvent, UserSession};
pub use user_data::{Field, UserData, ValidationError};
