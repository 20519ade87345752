use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SUMMARY_MAX_TOKENS, HISTORY_SEPARATOR};
use crate::utils::{HemisphairError, Result};

/// Settings for one conversation between two models
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Replies to the opening turn and writes the summary
    pub model_a: String,
    /// Opens the conversation
    pub model_b: String,
    /// Number of modelA turns after the opening
    pub max_turns: usize,
    pub max_tokens_per_turn: u32,
    /// Budget for the summary call, independent of the per-turn budget
    pub summary_max_tokens: u32,
}

impl SessionConfig {
    pub fn new(
        model_a: impl Into<String>,
        model_b: impl Into<String>,
        max_turns: usize,
        max_tokens_per_turn: u32,
    ) -> Result<Self> {
        let config = Self {
            model_a: model_a.into(),
            model_b: model_b.into(),
            max_turns,
            max_tokens_per_turn,
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_summary_tokens(mut self, summary_max_tokens: u32) -> Result<Self> {
        self.summary_max_tokens = summary_max_tokens;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tokens_per_turn == 0 {
            return Err(HemisphairError::Config(
                "max tokens per turn must be positive".to_string(),
            ));
        }
        if self.summary_max_tokens == 0 {
            return Err(HemisphairError::Config(
                "summary token budget must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
impl SessionConfig {
    /// Records produced before the summary: the opening plus two per exchange, minus
    /// the reply modelB never gets after the last modelA turn.
    pub fn expected_records(&self) -> usize {
        if self.max_turns == 0 {
            1
        } else {
            2 * self.max_turns
        }
    }
}

/// One completed turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub speaker: String,
    pub text: String,
}

impl TurnRecord {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.speaker, self.text)
    }
}

/// Append-only record of a single conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    records: Vec<TurnRecord>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TurnRecord) {
        self.records.push(record);
    }

    pub fn last(&self) -> Option<&TurnRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record as `speaker: text`, in order, separated by a blank line
    pub fn render(&self) -> String {
        self.records
            .iter()
            .map(TurnRecord::render)
            .collect::<Vec<_>>()
            .join(HISTORY_SEPARATOR)
    }

    pub fn into_records(self) -> Vec<TurnRecord> {
        self.records
    }
}
