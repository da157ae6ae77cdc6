use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use plainlaw_core::completion::{CompletionClient, CompletionOptions, CompletionOutcome};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Google Gemini `generateContent` over REST.
pub struct GeminiClient {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    api_key: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout_secs,
            api_key: api_key.into(),
            http,
        })
    }

    /// Endpoint without the key, safe to log.
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn generate_request<'a>(prompt: &'a str, options: &CompletionOptions) -> GenerateRequest<'a> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_output_tokens,
        },
    }
}

/// Concatenated text of the first candidate, or why there is none.
fn extract_text(response: GenerateResponse) -> std::result::Result<String, String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(format!("Gemini blocked the prompt: {reason}"));
    }
    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err("Gemini returned no candidates".into());
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(format!("Gemini returned empty content (finish reason {reason})"));
    }
    Ok(text)
}

#[async_trait]
impl CompletionClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> CompletionOutcome {
        let body = generate_request(prompt, options);
        let endpoint = self.endpoint();

        info!(
            model = %self.model,
            endpoint = %endpoint,
            prompt_len = prompt.len(),
            "calling gemini generateContent"
        );

        let request = self
            .http
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body);

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(timeout_secs = self.timeout_secs, "gemini request timed out");
                return CompletionOutcome::Failure(format!(
                    "Gemini request timed out after {}s",
                    self.timeout_secs
                ));
            },
            Err(e) => {
                // reqwest errors include the URL, which carries the key
                let e = e.without_url();
                warn!("gemini request failed: {}", e);
                return CompletionOutcome::Failure(format!("Gemini request failed: {}", e));
            },
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "gemini returned non-200: {}", body);
            return CompletionOutcome::Failure(format!("Gemini error {}: {}", status, body));
        }

        let parsed: GenerateResponse = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                let e = e.without_url();
                warn!("failed to parse gemini response: {}", e);
                return CompletionOutcome::Failure(format!("Failed to parse Gemini response: {}", e));
            },
        };

        match extract_text(parsed) {
            Ok(text) => {
                info!(output_len = text.len(), "gemini response received");
                CompletionOutcome::Success(text)
            },
            Err(reason) => {
                warn!("{}", reason);
                CompletionOutcome::Failure(reason)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_uses_camel_case_generation_config() {
        let options = CompletionOptions {
            temperature: 0.25,
            max_output_tokens: 512,
        };
        let value = serde_json::to_value(generate_request("rewrite", &options)).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "rewrite"}]}],
                "generationConfig": {"temperature": 0.25, "maxOutputTokens": 512}
            })
        );
    }

    #[test]
    fn parts_of_first_candidate_are_joined() {
        let response = parse(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "You must "}, {"text": "pay rent."}]},
                 "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }));
        assert_eq!(extract_text(response).unwrap(), "You must pay rent.");
    }

    #[test]
    fn blocked_prompt_is_a_failure() {
        let response = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
        assert_eq!(
            extract_text(response).unwrap_err(),
            "Gemini blocked the prompt: SAFETY"
        );
    }

    #[test]
    fn missing_candidates_is_a_failure() {
        let err = extract_text(parse(json!({}))).unwrap_err();
        assert!(err.contains("no candidates"));
    }

    #[test]
    fn empty_candidate_reports_finish_reason() {
        let response = parse(json!({
            "candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]
        }));
        let err = extract_text(response).unwrap_err();
        assert!(err.contains("MAX_TOKENS"));
    }

    #[test]
    fn endpoint_does_not_contain_the_key() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com/",
            "gemini-1.5-flash",
            "secret",
            30,
        )
        .unwrap();
        let endpoint = client.endpoint();
        assert_eq!(
            endpoint,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert!(!endpoint.contains("secret"));
    }

    #[tokio::test]
    async fn connection_errors_do_not_leak_the_key() {
        let client = GeminiClient::new("http://127.0.0.1:9", "m", "secret", 5).unwrap();
        match client.complete("hello", &CompletionOptions::default()).await {
            CompletionOutcome::Failure(reason) => assert!(!reason.contains("secret")),
            CompletionOutcome::Success(_) => panic!("expected failure"),
        }
    }
}
