/// Runtime orchestrator module - Gateway

mod console;
mod non_interactive;
mod orchestrator;

pub use console::ConsoleObserver;
pub use non_interactive::{NonInteractiveResult, NonInteractiveRunner};
pub use orchestrator::{is_exit_command, resolve_config, Orchestrator};
