use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::{
    chunker::Chunker,
    cleanup::final_cleanup,
    completion::{CompletionClient, CompletionOptions, CompletionOutcome},
    error::{PipelineError, PipelineResult},
    jargon::JargonNormalizer,
    prompt::build_simplify_prompt,
    segment::SentenceSegmenter,
    types::{ChunkOutcome, SimplificationResult},
};

/// Inputs shorter than this (trimmed) are returned untouched.
pub const MIN_DOCUMENT_CHARS: usize = 50;
/// Chunks shorter than this (trimmed) skip the completion call.
pub const MIN_CHUNK_CHARS: usize = 60;
/// Floor for an acceptable completion; the other bound is chunk length / 8.
pub const MIN_OUTPUT_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct SimplifierSettings {
    pub max_chunk_chars: usize,
    pub retry_attempts: u32,
    /// Wait `retry_backoff_base ^ attempt` seconds after failed attempt `attempt`.
    pub retry_backoff_base: f64,
    pub completion: CompletionOptions,
}

impl Default for SimplifierSettings {
    fn default() -> Self {
        Self {
            max_chunk_chars: 3000,
            retry_attempts: 3,
            retry_backoff_base: 1.5,
            completion: CompletionOptions::default(),
        }
    }
}

/// Rewrites legal text chunk by chunk through a completion service.
///
/// A failing service never fails the document: chunks the service cannot
/// handle keep their jargon-normalized original text.
pub struct Simplifier {
    client: Arc<dyn CompletionClient>,
    chunker: Chunker,
    jargon: Option<&'static JargonNormalizer>,
    settings: SimplifierSettings,
}

impl Simplifier {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        segmenter: Arc<dyn SentenceSegmenter>,
        settings: SimplifierSettings,
    ) -> PipelineResult<Self> {
        if settings.retry_attempts == 0 {
            return Err(PipelineError::InvalidConfig(
                "retry_attempts must be at least 1".into(),
            ));
        }
        if !settings.retry_backoff_base.is_finite() || settings.retry_backoff_base < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "retry_backoff_base must be a non-negative number, got {}",
                settings.retry_backoff_base
            )));
        }
        let chunker = Chunker::new(segmenter, settings.max_chunk_chars)?;
        let jargon = match JargonNormalizer::standard() {
            Ok(n) => Some(n),
            Err(e) => {
                warn!("jargon normalizer unavailable, text will not be normalized: {e}");
                None
            },
        };
        Ok(Self {
            client,
            chunker,
            jargon,
            settings,
        })
    }

    pub fn settings(&self) -> &SimplifierSettings {
        &self.settings
    }

    pub async fn simplify(&self, text: &str) -> PipelineResult<String> {
        Ok(self.simplify_detailed(text).await?.text)
    }

    pub async fn simplify_detailed(&self, text: &str) -> PipelineResult<SimplificationResult> {
        if text.trim().chars().count() < MIN_DOCUMENT_CHARS {
            return Ok(SimplificationResult {
                text: text.to_string(),
                chunks: Vec::new(),
            });
        }

        let normalized = self.normalize(text);
        let chunks = self.chunker.chunk(&normalized)?;
        let total = chunks.len();

        let mut parts = Vec::with_capacity(total);
        let mut outcomes = Vec::with_capacity(total);
        for (idx, chunk) in chunks.iter().enumerate() {
            info!(
                chunk = idx + 1,
                total,
                len = chunk.chars().count(),
                backend = self.client.name(),
                "simplifying chunk"
            );
            let (part, outcome) = self.simplify_chunk(chunk).await;
            parts.push(part);
            outcomes.push(outcome);
        }

        let result = SimplificationResult {
            text: final_cleanup(&parts.join("\n\n")),
            chunks: outcomes,
        };
        info!(
            chunks = total,
            simplified = result.count(ChunkOutcome::Simplified),
            fallback = result.count(ChunkOutcome::Fallback) + result.count(ChunkOutcome::Degenerate),
            "simplification finished"
        );
        Ok(result)
    }

    fn normalize(&self, text: &str) -> String {
        match self.jargon {
            Some(n) => n.normalize(text),
            None => text.to_string(),
        }
    }

    /// Simplify one chunk, degrading to the original text on any failure.
    async fn simplify_chunk(&self, chunk: &str) -> (String, ChunkOutcome) {
        let original = chunk.trim();
        if original.chars().count() < MIN_CHUNK_CHARS {
            return (original.to_string(), ChunkOutcome::PassedThrough);
        }

        match self.complete_with_retry(original).await {
            Ok(simplified) => match check_output(original, &simplified) {
                Ok(()) => (simplified, ChunkOutcome::Simplified),
                Err(e) => {
                    info!("{e}; falling back to original chunk");
                    (original.to_string(), ChunkOutcome::Degenerate)
                },
            },
            Err(e) => {
                warn!("{e}; returning original chunk");
                (original.to_string(), ChunkOutcome::Fallback)
            },
        }
    }

    async fn complete_with_retry(&self, chunk: &str) -> PipelineResult<String> {
        let prompt = build_simplify_prompt(chunk);
        let attempts = self.settings.retry_attempts;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let reason = match self.client.complete(&prompt, &self.settings.completion).await {
                CompletionOutcome::Success(text) => {
                    let text = text.replace("\r\n", "\n").trim().to_string();
                    if !text.is_empty() {
                        return Ok(text);
                    }
                    "empty response".to_string()
                },
                CompletionOutcome::Failure(reason) => reason,
            };

            if attempt < attempts {
                let wait = self.backoff(attempt);
                warn!(
                    attempt,
                    attempts,
                    backend = self.client.name(),
                    wait_secs = wait.as_secs_f64(),
                    "completion failed: {reason}; retrying"
                );
                tokio::time::sleep(wait).await;
            } else {
                warn!(attempt, attempts, backend = self.client.name(), "completion failed: {reason}");
            }
            last_error = reason;
        }

        Err(PipelineError::Completion(format!(
            "{} failed after {attempts} attempts: {last_error}",
            self.client.name()
        )))
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let secs = self
            .settings
            .retry_backoff_base
            .powi(i32::try_from(attempt).unwrap_or(i32::MAX));
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }
}

/// Reject outputs shorter than max(30, chunk length / 8).
fn check_output(chunk: &str, output: &str) -> PipelineResult<()> {
    let min = MIN_OUTPUT_CHARS.max(chunk.chars().count() / 8);
    let len = output.chars().count();
    if len < min {
        return Err(PipelineError::DegenerateOutput { len, min });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_threshold_uses_the_larger_bound() {
        let short_chunk = "x".repeat(100);
        assert!(check_output(&short_chunk, &"y".repeat(30)).is_ok());
        assert!(check_output(&short_chunk, &"y".repeat(29)).is_err());

        let long_chunk = "x".repeat(800);
        assert!(check_output(&long_chunk, &"y".repeat(99)).is_err());
        assert!(check_output(&long_chunk, &"y".repeat(100)).is_ok());
    }

    #[test]
    fn degenerate_error_reports_lengths() {
        let err = check_output(&"x".repeat(100), "...").unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateOutput { len: 3, min: 30 }));
    }
}
