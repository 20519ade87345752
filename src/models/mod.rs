// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod ollama;
mod stream;
mod traits;
mod types;

// Public re-exports - the ONLY way to access model functionality
pub use ollama::OllamaClient;
pub use stream::NdjsonDecoder;
pub use traits::ModelClient;
#[cfg(test)]
pub use traits::MockModelClient;
pub use types::{GenerateChunk, GenerateRequest, StreamCallback};
