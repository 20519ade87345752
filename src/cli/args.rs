use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::Config;

#[derive(Parser, Debug)]
#[command(name = "hemisphair")]
#[command(version)]
#[command(about = "Hemispheric brain simulation: two local LLMs discuss your question", long_about = None)]
pub struct Cli {
    /// Name of the first model (replies and summarizes)
    #[arg(long)]
    pub llm1: Option<String>,

    /// Name of the second model (opens the conversation)
    #[arg(long)]
    pub llm2: Option<String>,

    /// Maximum number of turns for each model
    #[arg(long)]
    pub max_turns: Option<usize>,

    /// Maximum tokens per response
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_tokens: Option<u32>,

    /// Maximum tokens for the final summary
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub summary_tokens: Option<u32>,

    /// Generate endpoint URL
    #[arg(long, env = "OLLAMA_GENERATE_URL")]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds (default: wait indefinitely)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run a single query and exit
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Output format for single-query mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, requires = "prompt")]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Flags given on the command line win over every config source
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(llm1) = &self.llm1 {
            config.models.primary = llm1.clone();
        }
        if let Some(llm2) = &self.llm2 {
            config.models.secondary = llm2.clone();
        }
        if let Some(max_turns) = self.max_turns {
            config.conversation.max_turns = max_turns;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.conversation.max_tokens_per_turn = max_tokens;
        }
        if let Some(summary_tokens) = self.summary_tokens {
            config.conversation.summary_max_tokens = summary_tokens;
        }
        if let Some(endpoint) = &self.endpoint {
            config.ollama.endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.timeout {
            config.ollama.request_timeout_secs = Some(timeout);
        }
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Check that the generate endpoint is reachable
    Status,
    /// Show version information
    Version,
    /// Start the interactive simulation (default)
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Stream the conversation as it happens
    Text,
    /// Print one JSON document with transcript and summary
    Json,
}
