pub mod analysis;
pub mod chunker;
pub mod clauses;
pub mod cleanup;
pub mod completion;
pub mod config;
pub mod error;
pub mod jargon;
pub mod prompt;
pub mod segment;
pub mod simplifier;
pub mod types;

pub use error::{PipelineError, PipelineResult};
pub use types::*;

/// Compile a pattern that is a literal in this crate.
#[allow(clippy::expect_used)]
pub(crate) fn static_regex(pattern: &str) -> regex::Regex {
    regex::Regex::new(pattern).expect("built-in regex must compile")
}
