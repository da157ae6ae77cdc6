use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{PipelineError, PipelineResult};

/// Legal phrase → plain phrase, applied in this order.
pub const JARGON_TABLE: &[(&str, &str)] = &[
    ("whereas", "while"),
    ("hereby", "by this document"),
    ("herein", "in this document"),
    ("hereinafter", "from now on called"),
    ("aforementioned", "mentioned before"),
    ("notwithstanding", "despite"),
    ("pursuant to", "according to"),
    ("in lieu of", "instead of"),
    ("forthwith", "immediately"),
    ("hereunder", "under this agreement"),
    ("heretofore", "until now"),
    ("ipso facto", "by the fact itself"),
    ("vis-à-vis", "in relation to"),
    ("inter alia", "among other things"),
    ("prima facie", "at first sight"),
    ("quid pro quo", "something for something"),
    ("sine qua non", "essential requirement"),
    ("force majeure", "unforeseeable circumstances"),
    ("caveat emptor", "buyer beware"),
];

static STANDARD: Lazy<Result<JargonNormalizer, String>> =
    Lazy::new(|| JargonNormalizer::new(JARGON_TABLE).map_err(|e| e.to_string()));

struct Rule {
    pattern: Regex,
    plain: &'static str,
}

/// Whole-word dictionary substitution of legal phrases.
///
/// Each rule is a separate pass over the text produced by the previous one,
/// so a later phrase can match text an earlier rule left alone.
pub struct JargonNormalizer {
    rules: Vec<Rule>,
}

impl JargonNormalizer {
    pub fn new(table: &[(&str, &'static str)]) -> PipelineResult<Self> {
        let rules = table
            .iter()
            .map(|(legal, plain)| {
                let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(legal)))
                    .map_err(|e| PipelineError::Normalization(format!("{legal:?}: {e}")))?;
                Ok(Rule { pattern, plain })
            })
            .collect::<PipelineResult<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// The process-wide normalizer built from [`JARGON_TABLE`].
    pub fn standard() -> PipelineResult<&'static JargonNormalizer> {
        STANDARD
            .as_ref()
            .map_err(|e| PipelineError::Normalization(e.clone()))
    }

    pub fn normalize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            let replaced = rule
                .pattern
                .replace_all(&out, |caps: &Captures| match_case(&caps[0], rule.plain));
            out = replaced.into_owned();
        }
        out
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Shape `plain` after the case of `matched`: "HEREBY" → upper, "Hereby" →
/// capitalized, anything else → as written in the table.
fn match_case(matched: &str, plain: &str) -> String {
    let mut letters = matched.chars().filter(|c| c.is_alphabetic()).peekable();
    let Some(first) = letters.peek().copied() else {
        return plain.to_string();
    };
    let all_upper = matched.chars().filter(|c| c.is_alphabetic()).count() > 1
        && letters.all(char::is_uppercase);
    if all_upper {
        return plain.to_uppercase();
    }
    if first.is_uppercase() {
        let mut chars = plain.chars();
        return match chars.next() {
            Some(c) => c.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    plain.to_string()
}
