#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use plainlaw_core::{
    completion::{CompletionClient, CompletionOptions, CompletionOutcome},
    error::{PipelineError, PipelineResult},
    segment::SentenceSegmenter,
};

/// Pull the chunk text back out of a simplification prompt.
pub fn chunk_from_prompt(prompt: &str) -> String {
    prompt
        .split("LEGAL TEXT:\n")
        .nth(1)
        .and_then(|rest| rest.split("\n\nSIMPLIFIED TEXT:").next())
        .unwrap_or_default()
        .to_string()
}

/// Replays a fixed list of outcomes, then fails.
pub struct ScriptedClient {
    script: Mutex<VecDeque<CompletionOutcome>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(script: Vec<CompletionOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> CompletionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| CompletionOutcome::Failure("script exhausted".into()))
    }
}

/// Always fails, like an unreachable service.
#[derive(Default)]
pub struct DownClient {
    calls: AtomicUsize,
}

impl DownClient {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for DownClient {
    fn name(&self) -> &str {
        "down"
    }

    async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> CompletionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CompletionOutcome::Failure("connection refused".into())
    }
}

/// Answers with "Plain: <chunk>" and remembers the options it saw.
#[derive(Default)]
pub struct EchoClient {
    pub seen: Mutex<Vec<(String, CompletionOptions)>>,
}

#[async_trait]
impl CompletionClient for EchoClient {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> CompletionOutcome {
        let chunk = chunk_from_prompt(prompt);
        self.seen.lock().unwrap().push((chunk.clone(), *options));
        CompletionOutcome::Success(format!("Plain: {chunk}"))
    }
}

/// A segmenter that always fails.
pub struct BrokenSegmenter;

impl SentenceSegmenter for BrokenSegmenter {
    fn segment(&self, _text: &str) -> PipelineResult<Vec<String>> {
        Err(PipelineError::Segmentation("model not loaded".into()))
    }
}

pub const LICENSE_S1: &str = "The Licensee shall pay all license fees within thirty days of invoice.";
pub const LICENSE_S2: &str = "The Licensor may terminate the license if the Licensee fails to pay.";
pub const LICENSE_S3: &str = "All disputes shall be resolved by binding arbitration in New York.";

/// A segmenter that panics, standing in for a detection bug.
pub struct PanickingSegmenter;

impl SentenceSegmenter for PanickingSegmenter {
    fn segment(&self, _text: &str) -> PipelineResult<Vec<String>> {
        panic!("segmenter bug");
    }
}
