use thiserror::Error;

/// Failure kinds raised along the analysis pipeline.
///
/// Only `EmptyInput`, `Segmentation` and `Detection` ever reach a caller of
/// [`crate::analysis::DocumentAnalyzer`] methods, and `InvalidConfig` comes
/// from construction. The remaining variants are recovered inside the
/// simplifier and only show up in logs and chunk outcomes.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not extract text from the document")]
    EmptyInput,

    #[error("jargon normalization failed: {0}")]
    Normalization(String),

    #[error("sentence segmentation failed: {0}")]
    Segmentation(String),

    #[error("completion failed: {0}")]
    Completion(String),

    #[error("completion output too short ({len} chars, need at least {min})")]
    DegenerateOutput { len: usize, min: usize },

    #[error("clause detection failed: {0}")]
    Detection(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
