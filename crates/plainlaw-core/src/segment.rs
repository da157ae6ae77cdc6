use unicode_segmentation::UnicodeSegmentation;

use crate::error::{PipelineError, PipelineResult};

/// Splits raw text into trimmed sentences, in source order.
///
/// Implementations must cover the whole input: dropping text between
/// sentences would make the chunker lossy.
pub trait SentenceSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> PipelineResult<Vec<String>>;
}

/// UAX #29 sentence boundaries.
///
/// Good enough for contracts; abbreviations like "Inc." occasionally end a
/// sentence early, which only costs a slightly smaller chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSegmenter;

impl SentenceSegmenter for UnicodeSegmenter {
    fn segment(&self, text: &str) -> PipelineResult<Vec<String>> {
        if text.contains('\0') {
            return Err(PipelineError::Segmentation(
                "input contains NUL bytes".into(),
            ));
        }
        Ok(text
            .split_sentence_bounds()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}
