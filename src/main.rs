use anyhow::{Context, Result};
use clap::Parser;

use hemisphair::{
    cli::Cli,
    models::OllamaClient,
    runtime::{resolve_config, NonInteractiveRunner, Orchestrator},
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    // Check if running in single-query mode
    if let Some(prompt) = cli.prompt.clone() {
        run_non_interactive(cli, prompt).await
    } else {
        let orchestrator = Orchestrator::new(cli)?;
        orchestrator.run().await
    }
}

/// Run in single-query mode
async fn run_non_interactive(cli: Cli, prompt: String) -> Result<()> {
    let config = resolve_config(&cli)?;
    let client = OllamaClient::from_config(&config.ollama).context("Failed to create HTTP client")?;
    let session = config.session_config()?;

    let runner = NonInteractiveRunner::new(&client, session, cli.output_format);
    let result = runner
        .execute(&prompt)
        .await
        .context("Conversation failed. Make sure Ollama is running and the models are available")?;

    if let Some(formatted) = runner.format_result(&result)? {
        println!("{}", formatted);
    }

    Ok(())
}
