use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::{
    clauses::ClauseDetector,
    completion::CompletionClient,
    error::{PipelineError, PipelineResult},
    segment::{SentenceSegmenter, UnicodeSegmenter},
    simplifier::{Simplifier, SimplifierSettings},
    types::{ClauseReport, DocumentAnalysis},
};

/// Runs both branches over one document: plain-language rewrite and clause
/// report. The branches share nothing but the input text.
pub struct DocumentAnalyzer {
    simplifier: Simplifier,
    detector: ClauseDetector,
}

impl DocumentAnalyzer {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        segmenter: Arc<dyn SentenceSegmenter>,
        settings: SimplifierSettings,
    ) -> PipelineResult<Self> {
        Ok(Self {
            simplifier: Simplifier::new(client, Arc::clone(&segmenter), settings)?,
            detector: ClauseDetector::new(segmenter),
        })
    }

    /// Analyzer with the default Unicode sentence segmenter.
    pub fn with_client(
        client: Arc<dyn CompletionClient>,
        settings: SimplifierSettings,
    ) -> PipelineResult<Self> {
        Self::new(client, Arc::new(UnicodeSegmenter), settings)
    }

    pub fn simplifier(&self) -> &Simplifier {
        &self.simplifier
    }

    pub async fn analyze(&self, text: &str) -> PipelineResult<DocumentAnalysis> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        info!(len = text.chars().count(), "analyzing document");

        let (report, simplified) = tokio::join!(self.detect(text), self.simplifier.simplify(text));
        let report = report?;
        let simplified_text = simplified?;

        info!(
            clauses = report.total_important_clauses,
            insights = report.insights.len(),
            "document analyzed"
        );
        Ok(DocumentAnalysis {
            original_text: text.to_string(),
            simplified_text,
            important_clauses: report,
            analyzed_at: Utc::now(),
        })
    }

    pub async fn simplify(&self, text: &str) -> PipelineResult<String> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        self.simplifier.simplify(text).await
    }

    /// Clause report for `text`, computed on the blocking pool so large
    /// documents do not hold up a runtime worker.
    pub async fn detect(&self, text: &str) -> PipelineResult<ClauseReport> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }
        let detector = self.detector.clone();
        let text = text.to_string();
        let report = match tokio::task::spawn_blocking(move || detector.detect(&text)).await {
            Ok(report) => report,
            Err(e) => Err(PipelineError::Detection(format!("detection task failed: {e}"))),
        };
        report.map_err(|e| {
            error!("clause detection failed: {e}");
            e
        })
    }
}
