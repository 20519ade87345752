use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use super::console::ConsoleObserver;
use crate::{
    cli::OutputFormat,
    models::ModelClient,
    session::{ConversationDriver, ConversationObserver, SessionConfig, SilentObserver, TurnRecord},
};

/// Result of a single-query run
#[derive(Debug, Serialize)]
pub struct NonInteractiveResult {
    /// The query that was discussed
    pub query: String,
    /// Both hemispheres
    pub models: ModelPair,
    /// Every turn before the summary, in order
    pub transcript: Vec<TurnRecord>,
    /// The primary model's summary
    pub summary: String,
    /// Wall-clock time for the whole conversation
    pub duration_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct ModelPair {
    pub primary: String,
    pub secondary: String,
}

/// Runs one conversation without the interactive shell
pub struct NonInteractiveRunner<'a> {
    client: &'a dyn ModelClient,
    session: SessionConfig,
    output_format: OutputFormat,
}

impl<'a> NonInteractiveRunner<'a> {
    pub fn new(client: &'a dyn ModelClient, session: SessionConfig, output_format: OutputFormat) -> Self {
        Self {
            client,
            session,
            output_format,
        }
    }

    /// Execute a single query and return the result
    pub async fn execute(&self, query: &str) -> Result<NonInteractiveResult> {
        let start_time = Instant::now();

        // JSON output must stay a single clean document on stdout
        let observer: Arc<dyn ConversationObserver> = match self.output_format {
            OutputFormat::Text => Arc::new(ConsoleObserver::stdout()),
            OutputFormat::Json => Arc::new(SilentObserver),
        };

        let driver = ConversationDriver::new(self.client, self.session.clone())?.with_observer(observer);
        let outcome = driver.run_with_transcript(query).await?;

        Ok(NonInteractiveResult {
            query: query.to_string(),
            models: ModelPair {
                primary: self.session.model_a.clone(),
                secondary: self.session.model_b.clone(),
            },
            transcript: outcome.transcript,
            summary: outcome.summary,
            duration_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Text still owed to stdout once the conversation has finished
    pub fn format_result(&self, result: &NonInteractiveResult) -> Result<Option<String>> {
        match self.output_format {
            // Already streamed turn by turn
            OutputFormat::Text => Ok(None),
            OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(result)?)),
        }
    }
}
