use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Clause classification ────────────────────────────────────────────────

/// Legal topic buckets used for keyword classification. Declaration order is
/// report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseCategory {
    Termination,
    Payment,
    Liability,
    Confidentiality,
    IntellectualProperty,
    DisputeResolution,
    DataPrivacy,
    ForceMajeure,
}

impl ClauseCategory {
    pub const ALL: [ClauseCategory; 8] = [
        Self::Termination,
        Self::Payment,
        Self::Liability,
        Self::Confidentiality,
        Self::IntellectualProperty,
        Self::DisputeResolution,
        Self::DataPrivacy,
        Self::ForceMajeure,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Termination => "termination",
            Self::Payment => "payment",
            Self::Liability => "liability",
            Self::Confidentiality => "confidentiality",
            Self::IntellectualProperty => "intellectual_property",
            Self::DisputeResolution => "dispute_resolution",
            Self::DataPrivacy => "data_privacy",
            Self::ForceMajeure => "force_majeure",
        }
    }

    /// Lowercase trigger phrases; a sentence containing any of them belongs
    /// to the category.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Termination => &[
                "terminate",
                "termination",
                "end this agreement",
                "cancel",
                "cancellation",
                "dissolution",
                "expire",
                "expiry",
            ],
            Self::Payment => &[
                "payment", "pay", "fee", "cost", "charge", "invoice", "billing", "due", "owe",
                "refund", "penalty", "fine",
            ],
            Self::Liability => &[
                "liable",
                "liability",
                "responsible",
                "responsibility",
                "damages",
                "compensation",
                "indemnify",
                "indemnification",
            ],
            Self::Confidentiality => &[
                "confidential",
                "confidentiality",
                "non-disclosure",
                "proprietary",
                "trade secret",
                "private information",
            ],
            Self::IntellectualProperty => &[
                "copyright",
                "patent",
                "trademark",
                "intellectual property",
                "proprietary rights",
                "ownership",
            ],
            Self::DisputeResolution => &[
                "dispute",
                "arbitration",
                "mediation",
                "litigation",
                "court",
                "jurisdiction",
                "governing law",
            ],
            Self::DataPrivacy => &[
                "personal data",
                "privacy",
                "data protection",
                "gdpr",
                "data processing",
                "consent",
                "data subject",
            ],
            Self::ForceMajeure => &[
                "force majeure",
                "act of god",
                "natural disaster",
                "unforeseeable circumstances",
                "beyond control",
            ],
        }
    }
}

impl std::fmt::Display for ClauseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// 0 terms → LOW, 1 → MEDIUM, 2 or more → HIGH.
    pub fn from_term_count(count: usize) -> Self {
        match count {
            0 => Self::Low,
            1 => Self::Medium,
            _ => Self::High,
        }
    }
}

/// A sentence that triggered a clause category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClauseMatch {
    pub text: String,
    pub risk_level: RiskLevel,
    pub keywords_found: Vec<String>,
}

/// A date or duration expression found in the raw document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    pub date_text: String,
    /// Up to 100 characters either side of the match, trimmed.
    pub context: String,
    /// Character offset of the match in the source text.
    pub position: usize,
}

/// Per-category matches plus the synthetic `deadlines` list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectedClauses {
    #[serde(flatten)]
    pub by_category: BTreeMap<ClauseCategory, Vec<ClauseMatch>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deadlines: Vec<Deadline>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClauseReport {
    pub clauses: DetectedClauses,
    pub insights: Vec<String>,
    pub total_important_clauses: usize,
}

impl ClauseReport {
    pub fn matches(&self, category: ClauseCategory) -> &[ClauseMatch] {
        self.clauses
            .by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has(&self, category: ClauseCategory) -> bool {
        !self.matches(category).is_empty()
    }

    pub fn deadlines(&self) -> &[Deadline] {
        &self.clauses.deadlines
    }
}

// ── Simplification ───────────────────────────────────────────────────────

/// How a single chunk ended up in the simplified document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkOutcome {
    /// Completion output was used.
    Simplified,
    /// Chunk too short to bother; no call made.
    PassedThrough,
    /// Every attempt failed; original chunk used.
    Fallback,
    /// Completion succeeded but was suspiciously short; original chunk used.
    Degenerate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplificationResult {
    pub text: String,
    /// One entry per chunk, in document order. Empty when the input was too
    /// short to chunk.
    pub chunks: Vec<ChunkOutcome>,
}

impl SimplificationResult {
    pub fn count(&self, outcome: ChunkOutcome) -> usize {
        self.chunks.iter().filter(|c| **c == outcome).count()
    }
}

// ── Document analysis ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DocumentAnalysis {
    pub original_text: String,
    pub simplified_text: String,
    pub important_clauses: ClauseReport,
    pub analyzed_at: DateTime<Utc>,
}
