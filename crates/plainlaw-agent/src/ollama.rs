use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use plainlaw_core::completion::{CompletionClient, CompletionOptions, CompletionOutcome};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Calls a locally-hosted Ollama model via its native chat API.
///
/// For deployments where document text must not leave the machine.
pub struct OllamaClient {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout_secs,
            http,
        })
    }

    fn url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

fn chat_request<'a>(model: &'a str, prompt: &'a str, options: &CompletionOptions) -> OllamaChatRequest<'a> {
    OllamaChatRequest {
        model,
        messages: vec![OllamaMessage {
            role: "user",
            content: prompt,
        }],
        stream: false,
        options: OllamaOptions {
            temperature: options.temperature,
            num_predict: options.max_output_tokens,
        },
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> CompletionOutcome {
        let body = chat_request(&self.model, prompt, options);

        info!(
            model = %self.model,
            base_url = %self.base_url,
            prompt_len = prompt.len(),
            "calling ollama chat API"
        );

        let response = match self.http.post(self.url()).json(&body).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(timeout_secs = self.timeout_secs, "ollama request timed out");
                return CompletionOutcome::Failure(format!(
                    "Ollama request timed out after {}s",
                    self.timeout_secs
                ));
            },
            Err(e) => {
                warn!("ollama request failed: {}", e);
                return CompletionOutcome::Failure(format!("Ollama request failed: {}", e));
            },
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "ollama returned non-200: {}", body);
            return CompletionOutcome::Failure(format!("Ollama error {}: {}", status, body));
        }

        let parsed: OllamaChatResponse = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("failed to parse ollama response: {}", e);
                return CompletionOutcome::Failure(format!("Failed to parse Ollama response: {}", e));
            },
        };

        let output = parsed.message.content;
        info!(output_len = output.len(), "ollama response received");
        if output.trim().is_empty() {
            return CompletionOutcome::Failure("Ollama returned empty content".into());
        }
        CompletionOutcome::Success(output)
    }
}
