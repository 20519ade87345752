pub mod app;
pub mod cli;
pub mod constants;
pub mod models;
pub mod runtime;
pub mod session;
pub mod utils;

pub use app::{load_config, Config};
pub use models::{ModelClient, OllamaClient};
pub use session::{ConversationDriver, SessionConfig, TurnRecord};
pub use utils::HemisphairError;
