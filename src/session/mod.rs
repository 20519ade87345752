/// Conversation driver module - Gateway

mod driver;
mod history;
mod templates;

pub use driver::{ConversationDriver, ConversationObserver, ConversationOutcome, SilentObserver, TurnKind};
pub use history::{ConversationHistory, SessionConfig, TurnRecord};
pub use templates::PromptTemplates;
