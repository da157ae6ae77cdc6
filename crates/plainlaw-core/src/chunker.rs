use std::sync::Arc;

use crate::{
    error::{PipelineError, PipelineResult},
    segment::SentenceSegmenter,
};

/// Packs sentences into chunks of at most `max_chars` characters.
pub struct Chunker {
    segmenter: Arc<dyn SentenceSegmenter>,
    max_chars: usize,
}

impl Chunker {
    pub fn new(segmenter: Arc<dyn SentenceSegmenter>, max_chars: usize) -> PipelineResult<Self> {
        if max_chars == 0 {
            return Err(PipelineError::InvalidConfig(
                "chunk size must be at least 1 character".into(),
            ));
        }
        Ok(Self {
            segmenter,
            max_chars,
        })
    }

    /// Greedy sentence packing. A sentence longer than `max_chars` is cut into
    /// raw `max_chars`-sized slices, each its own chunk.
    pub fn chunk(&self, text: &str) -> PipelineResult<Vec<String>> {
        let sentences = self.segmenter.segment(text)?;
        let max = self.max_chars;

        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for sentence in sentences {
            let len = sentence.chars().count();
            let joined_len = if current.is_empty() {
                len
            } else {
                current_len + 1 + len
            };

            if joined_len <= max {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&sentence);
                current_len = joined_len;
                continue;
            }

            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }

            if len > max {
                chunks.extend(slice_chars(&sentence, max));
            } else {
                current = sentence;
                current_len = len;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }
        Ok(chunks)
    }
}

fn slice_chars(s: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(size)
        .map(|piece| piece.iter().collect::<String>())
        .filter(|piece| !piece.is_empty())
        .collect()
}
