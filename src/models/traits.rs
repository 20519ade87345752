use async_trait::async_trait;

use super::types::StreamCallback;
use crate::utils::Result;

/// A text-generation endpoint that can be asked one prompt at a time
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Stream a completion for `prompt` from `model` and return the full text.
    ///
    /// Every fragment is handed to `on_fragment` as soon as it arrives, before the
    /// next one is read. The returned string is the concatenation of all fragments.
    async fn query(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
        on_fragment: Option<StreamCallback>,
    ) -> Result<String>;

    /// Check whether the endpoint answers at all
    async fn validate_connection(&self) -> Result<bool> {
        Ok(true)
    }
}
