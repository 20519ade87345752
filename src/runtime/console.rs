use colored::Colorize;
use std::io::{self, Write};
use std::sync::Mutex;

use crate::app::Config;
use crate::session::{ConversationObserver, TurnKind};

/// Prints the conversation to a terminal as it streams in
pub struct ConsoleObserver {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleObserver {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    fn write(&self, text: &str) {
        // A poisoned lock only means an earlier print panicked; keep printing
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

impl ConversationObserver for ConsoleObserver {
    fn on_turn_start(&self, speaker: &str, kind: TurnKind) {
        match kind {
            TurnKind::Summary => {
                self.write("\n🔄 Generating final summary...\n\n");
                self.write(&format!("🧠 Final Summary ({}): ", speaker.cyan().bold()));
            }
            TurnKind::Opening | TurnKind::Reply => {
                self.write(&format!("🧠 {}: ", speaker.bold()));
            }
        }
    }

    fn on_fragment(&self, fragment: &str) {
        self.write(fragment);
    }

    fn on_turn_end(&self, _speaker: &str, _kind: TurnKind, _text: &str) {
        self.write("\n");
    }
}

/// Startup banner for the interactive shell
pub fn print_banner(config: &Config) {
    println!("\n🧠 {}", "Hemispheric Brain Simulation".bold());
    println!(
        "🤖 Using models: {} and {}",
        config.models.primary.green(),
        config.models.secondary.green()
    );
    println!(
        "⚙️  Max turns: {}, Max tokens per turn: {}",
        config.conversation.max_turns, config.conversation.max_tokens_per_turn
    );
}

/// Header printed before each conversation
pub fn print_conversation_header(query: &str, config: &Config) {
    println!("\n🧠 {}", "Hemispheric Brain Simulation".bold());
    println!("📝 Query: {}\n", query);
    println!(
        "🔄 Starting conversation between {} and {}...\n",
        config.models.primary, config.models.secondary
    );
}
