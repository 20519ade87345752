use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::utils::{HemisphairError, Result};

/// Body of a streaming generate request
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub stream: bool,
}

impl<'a> GenerateRequest<'a> {
    pub fn streaming(model: &'a str, prompt: &'a str, max_tokens: u32) -> Self {
        Self {
            model,
            prompt,
            max_tokens,
            stream: true,
        }
    }
}

/// One line of a streamed generate response.
///
/// The server sends more fields (model, created_at, context, timings); only the
/// text fragment and the completion flag matter here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub done: bool,
}

impl GenerateChunk {
    /// Decode a single non-blank stream line. Invalid UTF-8 is rejected, not replaced.
    pub fn parse(line: &[u8]) -> Result<Self> {
        serde_json::from_slice(line).map_err(|source| HemisphairError::MalformedStream {
            line: String::from_utf8_lossy(line).into_owned(),
            source,
        })
    }
}

/// Stream callback type for real-time response streaming
pub type StreamCallback = Arc<dyn Fn(&str) + Send + Sync>;
