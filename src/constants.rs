/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_GENERATE_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const OLLAMA_TAGS_PATH: &str = "/api/tags";

// Timeouts
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 3;

// Default Models
pub const DEFAULT_PRIMARY_MODEL: &str = "llama3";
pub const DEFAULT_SECONDARY_MODEL: &str = "mistral";

// Conversation Defaults
pub const DEFAULT_MAX_TURNS: usize = 6;
pub const DEFAULT_MAX_TOKENS_PER_TURN: u32 = 200;
pub const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 400;

// Shell
pub const EXIT_COMMANDS: &[&str] = &["quit", "exit", "q"];
pub const HISTORY_SEPARATOR: &str = "\n\n";
