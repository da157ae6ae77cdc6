use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{
    error::PipelineResult,
    segment::SentenceSegmenter,
    static_regex,
    types::{ClauseCategory, ClauseMatch, ClauseReport, Deadline, DetectedClauses, RiskLevel},
};

/// Terms that raise a clause's risk level. Matched as plain substrings, so
/// "voided" counts as "void".
pub const HIGH_RISK_TERMS: &[&str] = &[
    "penalty",
    "fine",
    "breach",
    "default",
    "violation",
    "damages",
    "liquidated damages",
    "forfeit",
    "void",
    "terminate immediately",
    "irreparable harm",
];

/// Characters of context kept on each side of a deadline match.
pub const DEADLINE_CONTEXT_CHARS: usize = 100;

const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // 12/31/2024, 1-2-24
        static_regex(r"(?i)\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b"),
        // 15 March 2024
        static_regex(&format!(r"(?i)\b\d{{1,2}}\s+(?:{MONTHS})\s+\d{{2,4}}\b")),
        // March 15, 2024
        static_regex(&format!(r"(?i)\b(?:{MONTHS})\s+\d{{1,2}},?\s+\d{{4}}\b")),
        static_regex(r"(?i)\bwithin\s+\d+\s+(?:days?|weeks?|months?|years?)\b"),
        static_regex(r"(?i)\b\d+\s+(?:days?|weeks?|months?|years?)\s+(?:from|after|before)\b"),
    ]
});

/// Lexical scanner for legally significant sentences and deadlines.
#[derive(Clone)]
pub struct ClauseDetector {
    segmenter: Arc<dyn SentenceSegmenter>,
}

impl ClauseDetector {
    pub fn new(segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        Self { segmenter }
    }

    pub fn detect(&self, text: &str) -> PipelineResult<ClauseReport> {
        let sentences = self.segmenter.segment(text)?;

        let mut by_category = BTreeMap::new();
        for category in ClauseCategory::ALL {
            let matches = match_category(&sentences, category);
            if !matches.is_empty() {
                debug!(category = %category, count = matches.len(), "clause category matched");
                by_category.insert(category, matches);
            }
        }

        let clauses = DetectedClauses {
            by_category,
            deadlines: find_deadlines(text),
        };
        let total_important_clauses = clauses.by_category.values().map(Vec::len).sum::<usize>()
            + clauses.deadlines.len();

        let mut report = ClauseReport {
            clauses,
            insights: Vec::new(),
            total_important_clauses,
        };
        report.insights = insights(&report);
        Ok(report)
    }
}

fn match_category(sentences: &[String], category: ClauseCategory) -> Vec<ClauseMatch> {
    let keywords = category.keywords();
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for sentence in sentences {
        let lower = sentence.to_lowercase();
        let found: Vec<String> = keywords
            .iter()
            .filter(|kw| lower.contains(*kw))
            .map(|kw| kw.to_string())
            .collect();
        if found.is_empty() || !seen.insert(sentence.as_str()) {
            continue;
        }
        out.push(ClauseMatch {
            text: sentence.trim().to_string(),
            risk_level: assess_risk(sentence),
            keywords_found: found,
        });
    }
    out
}

/// Risk from the number of distinct high-risk terms in `text`.
pub fn assess_risk(text: &str) -> RiskLevel {
    let lower = text.to_lowercase();
    let count = HIGH_RISK_TERMS
        .iter()
        .filter(|term| lower.contains(*term))
        .count();
    RiskLevel::from_term_count(count)
}

/// All date and duration expressions, grouped by pattern, each pattern's
/// matches in text order.
pub fn find_deadlines(text: &str) -> Vec<Deadline> {
    let offsets = CharOffsets::new(text);
    let mut deadlines = Vec::new();

    for pattern in DATE_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            let start = offsets.char_at(m.start());
            let end = offsets.char_at(m.end());
            let ctx_start = offsets.byte_at(start.saturating_sub(DEADLINE_CONTEXT_CHARS));
            let ctx_end = offsets.byte_at(end + DEADLINE_CONTEXT_CHARS);

            deadlines.push(Deadline {
                date_text: m.as_str().to_string(),
                context: text[ctx_start..ctx_end].trim().to_string(),
                position: start,
            });
        }
    }
    deadlines
}

/// Byte offset of every char boundary in a string, plus the end.
struct CharOffsets {
    bytes: Vec<usize>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        let mut bytes: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        bytes.push(text.len());
        Self { bytes }
    }

    /// Char index of a byte offset that lies on a char boundary.
    fn char_at(&self, byte: usize) -> usize {
        self.bytes.partition_point(|&b| b < byte)
    }

    /// Byte offset of a char index, clamped to the end of the text.
    fn byte_at(&self, char_idx: usize) -> usize {
        let last = self.bytes.len() - 1;
        self.bytes[char_idx.min(last)]
    }
}

fn insights(report: &ClauseReport) -> Vec<String> {
    let mut out = Vec::new();

    if report.has(ClauseCategory::Termination) {
        out.push(
            "⚠️ This document contains termination clauses - review conditions for ending the agreement"
                .to_string(),
        );
    }

    if report
        .matches(ClauseCategory::Payment)
        .iter()
        .any(|m| m.risk_level == RiskLevel::High)
    {
        out.push("💰 High-risk payment terms detected - check for penalties or fees".to_string());
    }

    if report.has(ClauseCategory::Liability) {
        out.push(
            "⚖️ Liability clauses present - understand your responsibilities and potential damages"
                .to_string(),
        );
    }

    if !report.deadlines().is_empty() {
        out.push(format!(
            "📅 {} deadline(s) found - mark important dates on your calendar",
            report.deadlines().len()
        ));
    }

    if report.has(ClauseCategory::DataPrivacy) {
        out.push(
            "🔒 Data privacy terms included - review how your personal information will be handled"
                .to_string(),
        );
    }

    out
}
