use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

use super::stream::NdjsonDecoder;
use super::traits::ModelClient;
use super::types::{GenerateChunk, GenerateRequest, StreamCallback};
use crate::app::OllamaConfig;
use crate::constants::{HEALTH_CHECK_TIMEOUT_SECS, OLLAMA_TAGS_PATH};
use crate::utils::{HemisphairError, Result};

/// Client for an Ollama-style `/api/generate` endpoint
pub struct OllamaClient {
    client: Client,
    endpoint: String,
}

impl OllamaClient {
    /// Create a client for `endpoint`.
    ///
    /// `timeout` bounds each whole request; `None` waits forever.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &OllamaConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Model listing URL on the same server as the generate endpoint
    fn tags_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| {
            HemisphairError::Config(format!("Invalid endpoint '{}': {}", self.endpoint, e))
        })?;
        url.set_path(OLLAMA_TAGS_PATH);
        url.set_query(None);
        Ok(url)
    }
}

/// Fold one stream record into the accumulator. Returns true once the server signals completion.
fn consume_line(
    line: &[u8],
    full_response: &mut String,
    on_fragment: Option<&StreamCallback>,
) -> Result<bool> {
    let chunk = GenerateChunk::parse(line)?;
    if let Some(fragment) = chunk.response {
        if let Some(callback) = on_fragment {
            callback(&fragment);
        }
        full_response.push_str(&fragment);
    }
    Ok(chunk.done)
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn query(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
        on_fragment: Option<StreamCallback>,
    ) -> Result<String> {
        let request = GenerateRequest::streaming(model, prompt, max_tokens);
        debug!(
            model,
            max_tokens,
            prompt_chars = prompt.len(),
            endpoint = %self.endpoint,
            "sending generate request"
        );

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(model, status = status.as_u16(), "generate endpoint rejected request");
            return Err(HemisphairError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let mut stream = response.bytes_stream();
        let mut decoder = NdjsonDecoder::new();
        let mut full_response = String::new();
        let mut done = false;

        'stream: while let Some(chunk) = stream.next().await {
            decoder.push(&chunk?);
            while let Some(line) = decoder.next_line() {
                if consume_line(&line, &mut full_response, on_fragment.as_ref())? {
                    done = true;
                    break 'stream;
                }
            }
        }

        // A server may close the body without a trailing newline
        if !done {
            if let Some(line) = decoder.finish() {
                consume_line(&line, &mut full_response, on_fragment.as_ref())?;
            }
        }

        debug!(model, chars = full_response.len(), done, "generate stream finished");
        Ok(full_response)
    }

    async fn validate_connection(&self) -> Result<bool> {
        let url = self.tags_url()?;

        // Separate client so the health check never waits as long as a generation may
        let health_client = Client::builder()
            .timeout(Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS))
            .build()?;

        match health_client.get(url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                debug!(error = %e, "endpoint health check failed");
                Ok(false)
            }
        }
    }
}
