use anyhow::Result;
use colored::Colorize;

use crate::{
    app::{get_config_dir, init_config, Config},
    models::{ModelClient, OllamaClient},
};

use super::Commands;

/// Handle CLI subcommands. Returns true when the command was fully handled.
pub async fn handle_command(command: Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing Hemisphair configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
            Ok(true)
        }
        Commands::Status => {
            show_status(config).await?;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to the interactive shell
    }
}

/// Show version information
pub fn show_version() {
    println!("Hemisphair v{}", env!("CARGO_PKG_VERSION"));
    println!("   Two local LLMs talking your question through");
}

async fn show_status(config: &Config) -> Result<()> {
    println!("Hemisphair Status:");
    println!();

    let client = OllamaClient::from_config(&config.ollama)?;
    if client.validate_connection().await? {
        println!("  [OK] Endpoint: {}", client.endpoint().green());
    } else {
        println!("  [ERROR] Endpoint: {} is not answering", client.endpoint().red());
    }

    println!("  Models: {} and {}", config.models.primary, config.models.secondary);
    println!(
        "  Turns: {}, tokens per turn: {}, summary tokens: {}",
        config.conversation.max_turns,
        config.conversation.max_tokens_per_turn,
        config.conversation.summary_max_tokens
    );
    match config.ollama.request_timeout_secs {
        Some(secs) => println!("  Request timeout: {}s", secs),
        None => println!("  Request timeout: none"),
    }

    if let Ok(dir) = get_config_dir() {
        let config_path = dir.join("config.toml");
        if config_path.exists() {
            println!("  [OK] Configuration: {}", config_path.display());
        } else {
            println!("  [WARNING] Configuration: Not found (using defaults)");
        }
    }

    println!();
    Ok(())
}
