//! LLM provider trait for chat completions

use async_trait::async_trait;
use crate::error::Result;

/// Trait for single-turn chat completion
///
/// Implementations:
/// - `GroqClient`: OpenAI-compatible chat-completions API (Groq by default)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send `prompt` as a single user message and return the reply text
    async fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
