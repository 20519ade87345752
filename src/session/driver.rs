use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::history::{ConversationHistory, SessionConfig, TurnRecord};
use super::templates::PromptTemplates;
use crate::models::{ModelClient, StreamCallback};
use crate::utils::Result;

/// What a model is being asked to do on a given call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Opening,
    Reply,
    Summary,
}

/// Receives progress while a conversation runs
pub trait ConversationObserver: Send + Sync {
    fn on_turn_start(&self, _speaker: &str, _kind: TurnKind) {}

    /// Called for every streamed fragment, in arrival order
    fn on_fragment(&self, _fragment: &str) {}

    fn on_turn_end(&self, _speaker: &str, _kind: TurnKind, _text: &str) {}
}

/// Observer that ignores everything
pub struct SilentObserver;

impl ConversationObserver for SilentObserver {}

/// Result of a finished conversation
#[derive(Debug, Clone, Serialize)]
pub struct ConversationOutcome {
    pub summary: String,
    pub transcript: Vec<TurnRecord>,
}

#[derive(Debug)]
enum Phase {
    Opening,
    Alternating(usize),
    Summarizing,
    Done(String),
}

impl Phase {
    fn label(&self) -> &'static str {
        match self {
            Phase::Opening => "opening",
            Phase::Alternating(_) => "alternating",
            Phase::Summarizing => "summarizing",
            Phase::Done(_) => "done",
        }
    }
}

/// Runs the two-hemisphere exchange: modelB opens, the models alternate
/// (modelA always gets the last word), then modelA summarizes everything said.
pub struct ConversationDriver<'a> {
    client: &'a dyn ModelClient,
    config: SessionConfig,
    templates: PromptTemplates,
    observer: Arc<dyn ConversationObserver>,
}

impl<'a> ConversationDriver<'a> {
    pub fn new(client: &'a dyn ModelClient, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            templates: PromptTemplates::default(),
            observer: Arc::new(SilentObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn ConversationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_templates(mut self, templates: PromptTemplates) -> Self {
        self.templates = templates;
        self
    }

    /// Hold one conversation about `query` and return modelA's summary
    pub async fn run(&self, query: &str) -> Result<String> {
        Ok(self.run_with_transcript(query).await?.summary)
    }

    /// Like [`run`](Self::run), also handing back a copy of every turn
    pub async fn run_with_transcript(&self, query: &str) -> Result<ConversationOutcome> {
        let model_a = self.config.model_a.as_str();
        let model_b = self.config.model_b.as_str();
        let mut history = ConversationHistory::new();
        let mut phase = Phase::Opening;

        loop {
            debug!(phase = phase.label(), records = history.len(), "conversation step");

            phase = match phase {
                Phase::Opening => {
                    let prompt = self.templates.opening(query)?;
                    self.take_turn(&mut history, model_b, &prompt, TurnKind::Opening)
                        .await?;
                    Phase::Alternating(0)
                }
                Phase::Alternating(turn) if turn >= self.config.max_turns => Phase::Summarizing,
                Phase::Alternating(turn) => {
                    let prompt = self.reply_prompt(query, &history)?;
                    self.take_turn(&mut history, model_a, &prompt, TurnKind::Reply)
                        .await?;

                    if turn + 1 == self.config.max_turns {
                        Phase::Summarizing
                    } else {
                        let prompt = self.reply_prompt(query, &history)?;
                        self.take_turn(&mut history, model_b, &prompt, TurnKind::Reply)
                            .await?;
                        Phase::Alternating(turn + 1)
                    }
                }
                Phase::Summarizing => {
                    let prompt = self.templates.summary(query, &history)?;
                    let summary = self
                        .ask(model_a, &prompt, self.config.summary_max_tokens, TurnKind::Summary)
                        .await?;
                    Phase::Done(summary)
                }
                Phase::Done(summary) => {
                    debug!(records = history.len(), "conversation finished");
                    return Ok(ConversationOutcome {
                        summary,
                        transcript: history.into_records(),
                    });
                }
            };
        }
    }

    /// Prompt answering the most recent turn only
    fn reply_prompt(&self, query: &str, history: &ConversationHistory) -> Result<String> {
        let last = history.last().map(|r| r.text.as_str()).unwrap_or_default();
        self.templates.reply(query, last)
    }

    async fn take_turn(
        &self,
        history: &mut ConversationHistory,
        speaker: &str,
        prompt: &str,
        kind: TurnKind,
    ) -> Result<()> {
        let text = self
            .ask(speaker, prompt, self.config.max_tokens_per_turn, kind)
            .await?;
        history.push(TurnRecord::new(speaker, text));
        Ok(())
    }

    async fn ask(&self, speaker: &str, prompt: &str, max_tokens: u32, kind: TurnKind) -> Result<String> {
        self.observer.on_turn_start(speaker, kind);

        let observer = Arc::clone(&self.observer);
        let callback: StreamCallback = Arc::new(move |fragment: &str| observer.on_fragment(fragment));

        let text = self
            .client
            .query(speaker, prompt, max_tokens, Some(callback))
            .await?;

        self.observer.on_turn_end(speaker, kind, &text);
        Ok(text)
    }
}
