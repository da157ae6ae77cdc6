use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Generation parameters forwarded to the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 512,
        }
    }
}

/// What a completion call produced. Clients fold every transport, status
/// and response-shape problem into `Failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Success(String),
    Failure(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Short backend identifier used in logs (e.g. "gemini").
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> CompletionOutcome;
}
