use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::console::{print_banner, print_conversation_header, ConsoleObserver};
use crate::{
    app::{load_config, Config},
    cli::{handle_command, Cli},
    constants::EXIT_COMMANDS,
    models::{ModelClient, OllamaClient},
    session::{ConversationDriver, ConversationObserver},
    utils::log_debug,
};

/// Whether a line typed at the prompt ends the shell
pub fn is_exit_command(input: &str) -> bool {
    let input = input.trim().to_lowercase();
    EXIT_COMMANDS.contains(&input.as_str())
}

/// Configuration from every source, with command-line flags applied last
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        // An explicit --config that cannot be read is fatal; ambient files are not
        Err(e) if cli.config.is_some() => return Err(e),
        Err(e) => {
            eprintln!("⚠️  Failed to load config: {}. Using defaults.", e);
            Config::default()
        }
    };
    cli.apply_overrides(&mut config);
    Ok(config)
}

/// Read stdin on a plain thread so a pending read never holds up shutdown
fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Tell the user a conversation failed. Written once, to `out`; the shell keeps going.
fn report_failure(out: &mut dyn Write, error: &dyn std::fmt::Display) {
    let _ = writeln!(out, "\n❌ An error occurred: {}", error);
    let _ = writeln!(
        out,
        "   Make sure Ollama is running and the specified models are available."
    );
}

fn prompt_for_query() {
    print!("\n❓ Enter your query (or 'quit' to exit): ");
    let _ = std::io::stdout().flush();
}

/// Main runtime orchestrator for the interactive shell
pub struct Orchestrator {
    cli: Cli,
    config: Config,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        let config = resolve_config(&cli)?;
        Ok(Self { cli, config })
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        // Handle subcommands
        if let Some(command) = self.cli.command {
            if handle_command(command, &self.config).await? {
                return Ok(()); // Command handled, exit
            }
        }

        let client = OllamaClient::from_config(&self.config.ollama)
            .context("Failed to create HTTP client")?;
        let session = self.config.session_config()?;

        print_banner(&self.config);

        if !client.validate_connection().await.unwrap_or(false) {
            eprintln!(
                "⚠️  {} is not answering yet. Make sure Ollama is running.",
                client.endpoint().yellow()
            );
        }

        let observer: Arc<dyn ConversationObserver> = Arc::new(ConsoleObserver::stdout());
        let driver = ConversationDriver::new(&client, session)?.with_observer(observer);
        let mut input = spawn_input_reader();

        // Ctrl-C ends the shell, abandoning whatever conversation is in flight
        tokio::select! {
            _ = self.shell(&driver, &mut input) => {}
            _ = tokio::signal::ctrl_c() => println!(),
        }

        println!("Exiting the simulation. Goodbye!");
        Ok(())
    }

    async fn shell(
        &self,
        driver: &ConversationDriver<'_>,
        input: &mut mpsc::UnboundedReceiver<String>,
    ) {
        loop {
            prompt_for_query();
            let Some(line) = input.recv().await else {
                // stdin closed
                println!();
                return;
            };

            let query = line.trim();
            if is_exit_command(query) {
                return;
            }
            if query.is_empty() {
                continue;
            }

            print_conversation_header(query, &self.config);
            log_debug(format!("starting conversation ({} chars)", query.len()));

            // One failed conversation must not end the shell
            if let Err(e) = driver.run(query).await {
                log_debug(format!("conversation failed: {:?}", e));
                report_failure(&mut std::io::stderr(), &e);
            }
        }
    }
}
